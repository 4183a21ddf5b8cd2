use criterion::Criterion;
use criterion::black_box;
use criterion::criterion_group;
use criterion::criterion_main;
use mdflow::container::MarkdownContainer;
use mdflow::container::MarkdownContainerOptions;
use mdflow_core::text::NoHighlight;
use mdflow_core::theme::Theme;
use mdflow_syntax::SyntectHighlighter;
use std::sync::Arc;

fn sample_markdown(code_lines: usize) -> String {
    let mut s = String::new();
    s.push_str("# Performance\n\n");
    s.push_str("A long paragraph to stress wrapping. ");
    for _ in 0..12 {
        s.push_str("The quick brown fox jumps over the lazy dog. ");
    }
    s.push_str("\n\n");

    s.push_str("## Lists\n\n");
    for i in 0..20 {
        s.push_str(&format!("- item {i}\n  - nested {i}\n    - deeper {i}\n"));
    }
    s.push_str("- [x] done\n- [ ] todo\n\n");

    s.push_str("> [!NOTE]\n> Quoted text with `code` and a [link](https://example.com).\n\n");

    s.push_str("## Table\n\n");
    s.push_str("| Name | Value | Notes |\n");
    s.push_str("|:-----|------:|:------|\n");
    s.push_str("| foo  | 123   | left / right alignment |\n");
    s.push_str("| bar  | 456   | wraps when the terminal is narrow |\n\n");

    s.push_str("## Code\n\n");
    s.push_str("```rust\n");
    s.push_str("fn main() {\n");
    for i in 0..code_lines {
        s.push_str(&format!("    let x{i} = {i} + 1;\n"));
    }
    s.push_str("}\n");
    s.push_str("```\n");
    s
}

fn bench_set_text_no_highlight(c: &mut Criterion) {
    let theme = Theme::default();
    let md = sample_markdown(200);
    let hi = Arc::new(NoHighlight);
    c.bench_function("markdown_container/set_text+layout/no_highlight", |b| {
        b.iter(|| {
            let mut container = MarkdownContainer::with_options(MarkdownContainerOptions {
                show_code_line_numbers: true,
                ..Default::default()
            });
            container.set_highlighter(Some(hi.clone()));
            container.set_text(black_box(&md));
            let lines = container.lines_for_width(black_box(96), &theme);
            black_box(lines.len());
        })
    });
}

fn bench_set_text_syntect(c: &mut Criterion) {
    let theme = Theme::default();
    let md = sample_markdown(200);
    let hi = Arc::new(SyntectHighlighter::new());
    c.bench_function("markdown_container/set_text+layout/syntect", |b| {
        b.iter(|| {
            let mut container = MarkdownContainer::new();
            container.set_highlighter(Some(hi.clone()));
            container.set_text(black_box(&md));
            let lines = container.lines_for_width(black_box(96), &theme);
            black_box(lines.len());
        })
    });
}

fn bench_relayout_on_resize(c: &mut Criterion) {
    let theme = Theme::default();
    let md = sample_markdown(50);
    let mut container = MarkdownContainer::new();
    container.set_text(&md);
    let mut width = 60u16;
    c.bench_function("markdown_container/relayout/resize", |b| {
        b.iter(|| {
            width = if width == 60 { 61 } else { 60 };
            let lines = container.lines_for_width(black_box(width), &theme);
            black_box(lines.len());
        })
    });
}

criterion_group!(
    benches,
    bench_set_text_no_highlight,
    bench_set_text_syntect,
    bench_relayout_on_resize
);
criterion_main!(benches);
