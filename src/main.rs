use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use code_picture::clipboard::copy_png_to_clipboard;
use code_picture::{CodeImageRenderer, OutputFormat, RenderConfig, SyntectHighlighter};
use std::path::PathBuf;

/// Render source code as a syntax-highlighted image
#[derive(Parser, Debug)]
#[command(name = "code-picture")]
#[command(version)]
#[command(about = "Render source code to a syntax-highlighted PNG, SVG or PDF", long_about = None)]
struct Args {
    /// Input source file (use "-" for stdin)
    #[arg(value_name = "INPUT", required_unless_present_any = ["completions", "list_languages"])]
    input: Option<PathBuf>,

    /// Output file path (extension determines format: .png, .svg or .pdf)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Language id or file extension (defaults to the input's extension)
    #[arg(short, long, value_name = "LANGUAGE")]
    language: Option<String>,

    /// Path to a render config file (TOML, YAML or JSON)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Font family stack, e.g. "Fira Code, monospace"
    #[arg(long, value_name = "FAMILY")]
    font_family: Option<String>,

    /// Copy the PNG to the system clipboard
    #[arg(long)]
    copy: bool,

    /// List the languages with syntax highlighting and exit
    #[arg(long)]
    list_languages: bool,

    /// Print shell completions and exit
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

/// Bytes already written as PNG can go to the clipboard without a second
/// render.
fn clipboard_ready(format: OutputFormat, data: Vec<u8>) -> Option<Vec<u8>> {
    (format == OutputFormat::Png).then_some(data)
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    if let Some(shell) = args.completions {
        let mut cmd = Args::command();
        clap_complete::generate(shell, &mut cmd, "code-picture", &mut std::io::stdout());
        return Ok(());
    }

    if args.list_languages {
        for name in SyntectHighlighter::new().languages() {
            println!("{}", name);
        }
        return Ok(());
    }

    let input = args.input.ok_or("No input file given")?;
    if args.output.is_none() && !args.copy {
        return Err("Nothing to do: pass --output and/or --copy".to_string());
    }

    let mut config = match args.config {
        Some(ref path) => RenderConfig::load(path)
            .map_err(|e| format!("Failed to load config {}: {}", path.display(), e))?,
        None => RenderConfig::default(),
    };
    if args.font_family.is_some() {
        config.font_family = args.font_family;
    }

    let from_stdin = input.to_str() == Some("-");
    let code = if from_stdin {
        let mut buffer = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut buffer)
            .map_err(|e| format!("Failed to read from stdin: {}", e))?;
        buffer
    } else {
        std::fs::read_to_string(&input).map_err(|e| format!("Failed to read input file: {}", e))?
    };

    let language = args
        .language
        .or_else(|| {
            if from_stdin {
                None
            } else {
                input
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(str::to_string)
            }
        })
        .unwrap_or_else(|| "plaintext".to_string());

    let mut renderer = CodeImageRenderer::with_system_fonts(config);

    let mut png = None;

    if let Some(ref output) = args.output {
        let format = OutputFormat::from_path(output).ok_or_else(|| {
            format!(
                "Unsupported output format: {} (use .png, .svg or .pdf)",
                output.display()
            )
        })?;

        let data = renderer
            .render(&code, &language, format)
            .map_err(|e| e.to_string())?;
        std::fs::write(output, &data).map_err(|e| format!("Failed to write image: {}", e))?;
        eprintln!("Image saved to: {}", output.display());

        png = clipboard_ready(format, data);
    }

    if args.copy {
        let png = match png {
            Some(png) => png,
            None => renderer
                .render_png(&code, &language)
                .map_err(|e| e.to_string())?,
        };
        copy_png_to_clipboard(&png).map_err(|e| e.to_string())?;
        eprintln!("Image copied to clipboard");
    }

    Ok(())
}
