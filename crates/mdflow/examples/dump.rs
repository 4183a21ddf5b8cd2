use mdflow::container::MarkdownContainer;
use mdflow::container::MarkdownContainerOptions;
use mdflow::table::TableStyle;
use mdflow_core::layout::MarginPadding;
use mdflow_core::render::spans_plain;
use mdflow_core::theme::Theme;
use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

fn main() -> io::Result<()> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        print_help();
        return Ok(());
    }

    let mut options = MarkdownContainerOptions {
        show_scrollbar: false,
        ..MarkdownContainerOptions::default()
    };
    let mut width: u16 = 80;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--width" => width = parse_u16(&args, &mut i, "--width")?,
            "--spacing" => options.spacing = parse_u16(&args, &mut i, "--spacing")?,
            "--no-margin" => {
                options.margin = MarginPadding::ZERO;
                options.padding = MarginPadding::ZERO;
                i += 1;
            }
            "--line-numbers" => {
                options.show_code_line_numbers = true;
                i += 1;
            }
            "--show-link-destinations" => {
                options.show_link_destinations = true;
                i += 1;
            }
            "--base-url" => {
                options.base_url = Some(parse_string(&args, &mut i, "--base-url")?);
            }
            "--table-style" => {
                let v = parse_string(&args, &mut i, "--table-style")?;
                options.table_style = match v.as_str() {
                    "glow" => TableStyle::Glow,
                    "box" => TableStyle::Box,
                    other => {
                        return Err(io::Error::new(
                            io::ErrorKind::InvalidInput,
                            format!("unknown table style: {other}"),
                        ));
                    }
                };
            }
            _ => break,
        }
    }

    let input = if i < args.len() {
        let path = &args[i];
        let input = fs::read_to_string(path)?;
        if options.base_url.is_none()
            && let Some(parent) = Path::new(path).parent()
        {
            let abs = fs::canonicalize(parent).unwrap_or_else(|_| parent.to_path_buf());
            options.base_url = Some(format!("{}/", abs.display()));
        }
        input
    } else {
        let mut s = String::new();
        io::stdin().read_to_string(&mut s)?;
        s
    };

    let mut container = MarkdownContainer::with_options(options);
    container.set_text(&input);

    let theme = Theme::default();
    for line in container.lines_for_width(width, &theme) {
        println!("{}", spans_plain(&line.spans).trim_end());
    }

    Ok(())
}

fn print_help() {
    eprintln!(
        "Usage: dump [options] [path]\n\
\n\
Options:\n\
  --width <n>                 Layout width (default: 80)\n\
  --spacing <n>               Blank rows between top-level blocks (default: 1)\n\
  --no-margin                 Drop the default margin and padding\n\
  --line-numbers              Number code block lines\n\
  --show-link-destinations    Show (url) after link text\n\
  --base-url <url>            Resolve relative links against this base\n\
  --table-style <glow|box>    Table rendering style (default: glow)\n\
  -h, --help                  Show this help\n\
\n\
If [path] is omitted, reads Markdown from stdin."
    );
}

fn parse_u16(args: &[String], i: &mut usize, flag: &str) -> io::Result<u16> {
    let Some(v) = args.get(*i + 1) else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{flag} expects a value"),
        ));
    };
    *i += 2;
    v.parse::<u16>().map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{flag} invalid u16: {e}"),
        )
    })
}

fn parse_string(args: &[String], i: &mut usize, flag: &str) -> io::Result<String> {
    let Some(v) = args.get(*i + 1) else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{flag} expects a value"),
        ));
    };
    *i += 2;
    Ok(v.to_string())
}
