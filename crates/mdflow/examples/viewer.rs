use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableMouseCapture;
use crossterm::event::Event;
use crossterm::event::KeyCode;
use crossterm::event::KeyEventKind;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use mdflow::container::MarkdownContainer;
use mdflow::container::MarkdownContainerOptions;
use mdflow::table::TableStyle;
use mdflow_core::crossterm_input::input_event_from_crossterm;
use mdflow_core::theme::Theme;
use mdflow_syntax::SyntectHighlighter;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Constraint;
use ratatui::layout::Direction;
use ratatui::layout::Layout;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Paragraph;
use std::env;
use std::fs;
use std::io;
use std::sync::Arc;
use std::time::Duration;

struct App {
    title: String,
    container: MarkdownContainer,
    headings: Vec<String>,
    heading_idx: usize,
}

fn main() -> io::Result<()> {
    let (title, text) = match env::args().nth(1) {
        Some(path) => {
            let text = fs::read_to_string(&path)?;
            (path, text)
        }
        None => ("demo".to_string(), demo_markdown()),
    };

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    crossterm::execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let theme = Theme::default();
    let mut container = MarkdownContainer::with_options(MarkdownContainerOptions {
        show_code_line_numbers: true,
        ..Default::default()
    });
    container.set_highlighter(Some(Arc::new(SyntectHighlighter::new())));
    container.set_text(&text);
    let headings: Vec<String> = container
        .document()
        .heading_ids()
        .into_iter()
        .map(str::to_string)
        .collect();

    let mut app = App {
        title,
        container,
        headings,
        heading_idx: 0,
    };

    let res = run(&mut terminal, &theme, &mut app);
    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    res
}

fn run<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    theme: &Theme,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, theme, app))?;

        if !crossterm::event::poll(Duration::from_millis(250))? {
            continue;
        }
        let ev = crossterm::event::read()?;
        if let Event::Key(key) = &ev {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Char('t') => {
                    let next = match app.container.options().table_style {
                        TableStyle::Glow => TableStyle::Box,
                        TableStyle::Box => TableStyle::Glow,
                    };
                    app.container.set_table_style(next);
                    continue;
                }
                KeyCode::Char('n') | KeyCode::Tab if !app.headings.is_empty() => {
                    app.heading_idx = (app.heading_idx + 1) % app.headings.len();
                    let id = app.headings[app.heading_idx].clone();
                    app.container.scroll_to_anchor(&id);
                    continue;
                }
                _ => {}
            }
        }
        if let Some(ev) = input_event_from_crossterm(ev) {
            app.container.handle_event(ev);
        }
    }
}

fn ui(f: &mut ratatui::Frame<'_>, theme: &Theme, app: &mut App) {
    let area = f.area();
    let [main, status_area] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .areas(area);

    let block = Block::default()
        .title(app.title.as_str())
        .borders(Borders::ALL);
    let inner = block.inner(main);
    f.render_widget(block, main);
    app.container.render_ref(inner, f.buffer_mut(), theme);

    let position = app
        .container
        .state
        .percent_y()
        .map(|p| format!("{p}%"))
        .unwrap_or("all".to_string());
    let status = format!(
        "q quit | j/k/wheel scroll | n next heading | t table={:?} | {}",
        app.container.options().table_style,
        position,
    );
    let p = Paragraph::new(Line::from(vec![Span::styled(status, theme.text_muted)]));
    f.render_widget(p, status_area);
}

fn demo_markdown() -> String {
    let mut s = String::new();
    s.push_str("# mdflow viewer\n\n");
    s.push_str("Each block becomes a widget in a vertical flow.\n\n");
    s.push_str("## Lists\n\n");
    s.push_str("- first layer\n  - second layer\n    - third layer\n      - fourth layer\n");
    s.push_str("- [x] finished task\n- [ ] open task\n\n");
    s.push_str("## Quote\n\n");
    s.push_str("> [!TIP]\n> Press `t` to switch table styles.\n\n");
    s.push_str("## Table\n\n");
    s.push_str("| Name | Value | Notes |\n");
    s.push_str("|:-----|------:|:------|\n");
    s.push_str("| foo  | 123   | left / right alignment |\n");
    s.push_str("| bar  | 456   | wraps when the terminal is narrow |\n\n");
    s.push_str("## Code\n\n");
    s.push_str("```rust\nfn main() {\n    println!(\"hello\");\n}\n```\n\n");
    s.push_str("---\n\n");
    s.push_str("A long paragraph to test wrapping. ");
    for _ in 0..6 {
        s.push_str("The quick brown fox jumps over the lazy dog. ");
    }
    s.push('\n');
    s
}
