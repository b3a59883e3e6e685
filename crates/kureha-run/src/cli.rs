use clap::Parser;
use colored::Colorize;
use kureha_lang::{Node, ParseResult};
use kureha_minifier::{Minifier, RenderOptions};
use miette::IntoDiagnostic;
use miette::miette;
use rayon::prelude::*;
use std::io::IsTerminal;
use std::io::{self, BufWriter, Read, Write};
use std::{fs, path::PathBuf};

const DEFAULT_PARALLEL_THRESHOLD: usize = 10;

#[derive(Parser, Debug)]
#[command(name = "kureha")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(after_help = "# Examples:\n\n\
    ## To minify a parse tree dumped as JSON:\n\
    kureha tree.json\n\n\
    ## To read the tree from stdin:\n\
    ruby dump_tree.rb app.rb | kureha\n\n\
    ## To write minified files into a directory:\n\
    kureha -o dist/ lib/*.json\n\n\
    ## To check that every tree can be rendered:\n\
    kureha --check lib/*.json")]
#[command(
    about = "kureha renders Ruby parse trees as compact, whitespace-stripped source.",
    long_about = None
)]
pub struct Cli {
    #[clap(flatten)]
    render: RenderArgs,

    #[clap(flatten)]
    output: OutputArgs,

    /// Number of files to process before switching to parallel processing
    #[arg(short = 'P', default_value_t = DEFAULT_PARALLEL_THRESHOLD)]
    parallel_threshold: usize,

    /// JSON parse results to render; reads stdin when omitted
    files: Option<Vec<PathBuf>>,
}

#[derive(Clone, Debug, clap::Args, Default)]
struct RenderArgs {
    /// Join statements with newlines instead of `;`
    #[arg(long, default_value_t = false)]
    no_separators: bool,

    /// Keep comments in the output
    #[arg(long, default_value_t = false)]
    keep_comments: bool,

    /// Keep blank lines between statements
    #[arg(long, default_value_t = false)]
    keep_blank_lines: bool,

    /// Always put a space after keywords and command names
    #[arg(long, default_value_t = false)]
    space_after_keywords: bool,
}

impl From<&RenderArgs> for RenderOptions {
    fn from(args: &RenderArgs) -> Self {
        RenderOptions {
            insert_separators: !args.no_separators,
            strip_comments: !args.keep_comments,
            strip_blank_lines: !args.keep_blank_lines,
            space_after_keywords: args.space_after_keywords,
        }
    }
}

#[derive(Clone, Debug, clap::Args, Default)]
struct OutputArgs {
    /// Write each rendered file as `<name>.rb` into the directory
    #[clap(short = 'o', long = "output-dir", value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Only check that every input renders, without writing output
    #[arg(long, default_value_t = false)]
    check: bool,
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            render: RenderArgs::default(),
            output: OutputArgs::default(),
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            files: None,
        }
    }
}

type Rendered = (Option<PathBuf>, Result<String, String>);

impl Cli {
    pub fn run(&self) -> miette::Result<()> {
        let contents = self.read_contents()?;
        let minifier = Minifier::new(Some(RenderOptions::from(&self.render)));

        tracing::debug!(files = contents.len(), "rendering inputs");

        let render = |(file, content): &(Option<PathBuf>, String)| -> Rendered {
            let _span = tracing::debug_span!("file", path = ?file).entered();
            (file.clone(), Self::render_content(&minifier, content))
        };

        let rendered: Vec<Rendered> = if contents.len() > self.parallel_threshold {
            contents.par_iter().map(render).collect()
        } else {
            contents.iter().map(render).collect()
        };

        if self.output.check {
            self.report(&rendered)
        } else {
            self.write(rendered)
        }
    }

    /// Accepts a full parse result, or a bare tree with no diagnostics.
    fn render_content(minifier: &Minifier, content: &str) -> Result<String, String> {
        let result = ParseResult::from_json(content)
            .or_else(|_| Node::from_json(content).map(ParseResult::from))
            .map_err(|e| format!("Invalid parse tree: {}", e))?;

        minifier.minify(&result).map_err(|e| e.to_string())
    }

    fn report(&self, rendered: &[Rendered]) -> miette::Result<()> {
        let stdout = io::stdout();
        let mut handle = BufWriter::new(stdout.lock());
        let mut failed = 0;

        for (file, result) in rendered {
            if let Err(message) = result {
                failed += 1;
                writeln!(handle, "{}", format!("Checking: {}", display_name(file)).bold()).into_diagnostic()?;
                writeln!(handle, "  {}: {}", "Error".red().bold(), message).into_diagnostic()?;
                writeln!(handle).into_diagnostic()?;
            }
        }

        handle.flush().into_diagnostic()?;
        tracing::info!(checked = rendered.len(), failed, "check finished");

        if failed > 0 {
            Err(miette!("{} of {} input(s) failed to render", failed, rendered.len()))
        } else {
            Ok(())
        }
    }

    fn write(&self, rendered: Vec<Rendered>) -> miette::Result<()> {
        if let Some(output_dir) = &self.output.output_dir {
            fs::create_dir_all(output_dir).into_diagnostic()?;
        }

        let stdout = io::stdout();
        let mut handle = BufWriter::new(stdout.lock());

        for (file, result) in rendered {
            let output = result.map_err(|message| miette!("{}: {}", display_name(&file), message))?;

            match (&self.output.output_dir, &file) {
                (Some(output_dir), Some(file)) => {
                    let stem = file
                        .file_stem()
                        .ok_or_else(|| miette!("Cannot derive an output name from {}", file.display()))?;
                    let target = output_dir.join(stem).with_extension("rb");

                    tracing::debug!(path = %target.display(), "writing output");
                    fs::write(&target, format!("{}\n", output)).into_diagnostic()?;
                }
                (Some(_), None) => return Err(miette!("--output-dir requires input files")),
                (None, _) => writeln!(handle, "{}", output).into_diagnostic()?,
            }
        }

        handle.flush().into_diagnostic()
    }

    fn read_contents(&self) -> miette::Result<Vec<(Option<PathBuf>, String)>> {
        match &self.files {
            Some(files) => files
                .iter()
                .map(|file| {
                    if !file.exists() {
                        return Err(miette!("File not found: {}", file.display()));
                    }

                    fs::read_to_string(file)
                        .into_diagnostic()
                        .map(|content| (Some(file.clone()), content))
                })
                .collect(),
            None => {
                if io::stdin().is_terminal() {
                    return Err(miette!("No input files given and stdin is a terminal"));
                }

                let mut input = String::new();
                io::stdin().read_to_string(&mut input).into_diagnostic()?;
                Ok(vec![(None, input)])
            }
        }
    }
}

fn display_name(file: &Option<PathBuf>) -> String {
    file.as_ref()
        .map(|file| file.display().to_string())
        .unwrap_or_else(|| "<stdin>".to_string())
}
