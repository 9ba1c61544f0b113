use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;
use stw_tags::{Context, Library, config, render};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "stw-tags")]
#[command(version)]
#[command(about = "Render ShrinkTheWeb thumbnail tags")]
#[command(long_about = "\
Render ShrinkTheWeb thumbnail tags

Tags are written the way they appear inside a template, without the
surrounding {% %}. Quoted arguments are literals; bare arguments are looked
up among the --var values.

  stw-tags --var author.url=http://example.com \\
      tag stwimage author.url \"'Example'\" stwsize=lrg

  stw-tags tag shrinkthewebimage \"'http://example.com'\" sm stwinside=1

Default options, including the required stwaccesskeyid, come from the
settings file. Run 'stw-tags gen-config' to print a documented one.")]
struct Cli {
    /// Settings file with default options
    #[arg(long, default_value = "settings.toml", global = true)]
    settings: PathBuf,

    /// Context variable, NAME=VALUE; VALUE is parsed as JSON when possible
    #[arg(long = "var", value_name = "NAME=VALUE", global = true)]
    vars: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile and render one tag invocation
    Tag {
        /// Tag name followed by its arguments
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        body: Vec<String>,
    },
    /// Print the script include for the vendor's preview JavaScript
    Javascript,
    /// Print a stock settings.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stw_tags=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Tag { body } => {
            let settings = config::load_settings(&cli.settings)?;
            let context = build_context(&cli.vars)?;
            let node = Library::default().compile(&body.join(" "), &settings)?;
            println!("{}", node.render(&context)?);
        }
        Command::Javascript => {
            let settings = config::load_settings(&cli.settings)?;
            println!("{}", render::stwjavascript_for(settings.scheme()));
        }
        Command::GenConfig => {
            print!("{}", config::stock_settings_toml());
        }
    }

    Ok(())
}

/// Build a render context from `NAME=VALUE` pairs.
fn build_context(vars: &[String]) -> Result<Context, Box<dyn std::error::Error>> {
    let mut context = Context::new();
    for var in vars {
        let (name, raw) = var
            .split_once('=')
            .ok_or_else(|| format!("--var '{var}' is not of the form NAME=VALUE"))?;
        let value = serde_json::from_str::<Value>(raw)
            .unwrap_or_else(|_| Value::String(raw.to_string()));
        context.insert(name, value);
    }
    Ok(context)
}
