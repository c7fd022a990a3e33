use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use pdf_template::tools;
use serde_json::{Map, Value, json};
use std::fs;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pdf-template")]
#[command(
    version,
    about = "Extract reusable templates from PDFs and fill them with data"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
#[command(
    group(
        clap::ArgGroup::new("input")
            .required(true)
            .multiple(false)
            .args(["path", "base64"])
    )
)]
struct InputArgs {
    /// Path to the source PDF
    #[arg(long)]
    path: Option<String>,
    /// Base64-encoded PDF bytes
    #[arg(long)]
    base64: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum TextSourceArg {
    Proportional,
    PerPage,
}

impl TextSourceArg {
    fn as_str(self) -> &'static str {
        match self {
            TextSourceArg::Proportional => "proportional",
            TextSourceArg::PerPage => "per_page",
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum MissingFieldArg {
    LeavePlaceholder,
    UseDefault,
    EmptyString,
}

impl MissingFieldArg {
    fn as_str(self) -> &'static str {
        match self {
            MissingFieldArg::LeavePlaceholder => "leave_placeholder",
            MissingFieldArg::UseDefault => "use_default",
            MissingFieldArg::EmptyString => "empty_string",
        }
    }
}

#[derive(Args, Clone)]
struct ExtractTemplateArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Output JSON structuredContent
    #[arg(long)]
    json: bool,
    /// Template name stored in metadata
    #[arg(long)]
    name: Option<String>,
    /// Template description stored in metadata
    #[arg(long)]
    description: Option<String>,
    /// How document text is split across pages
    #[arg(long, value_enum)]
    text_source: Option<TextSourceArg>,
    /// Write the template JSON to this file
    #[arg(long)]
    output: Option<String>,
}

#[derive(Args, Clone)]
struct GenerateDocumentArgs {
    /// Path to the template JSON
    #[arg(long)]
    template: String,
    /// Field values as a JSON object
    #[arg(long, conflicts_with = "data_file")]
    data: Option<String>,
    /// Path to a JSON file with field values
    #[arg(long)]
    data_file: Option<String>,
    /// What to do with placeholders that have no value
    #[arg(long, value_enum)]
    missing_field_behavior: Option<MissingFieldArg>,
    /// Write the PDF to this file
    #[arg(long)]
    output: Option<String>,
    /// Output JSON structuredContent
    #[arg(long)]
    json: bool,
}

#[derive(Args, Clone)]
struct InspectTemplateArgs {
    /// Path to the template JSON
    #[arg(long)]
    template: String,
    /// Output JSON structuredContent
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a template from a source PDF
    ExtractTemplate(ExtractTemplateArgs),
    /// Render a PDF from a template and data
    GenerateDocument(GenerateDocumentArgs),
    /// Validate and summarize a template
    InspectTemplate(InspectTemplateArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf_template=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::ExtractTemplate(args) => run_extract_template(args),
        Commands::GenerateDocument(args) => run_generate_document(args),
        Commands::InspectTemplate(args) => run_inspect_template(args),
    }
}

fn run_extract_template(args: ExtractTemplateArgs) -> Result<()> {
    let mut map = build_input_args(&args.input);
    if let Some(name) = args.name {
        map.insert("name".to_string(), json!(name));
    }
    if let Some(description) = args.description {
        map.insert("description".to_string(), json!(description));
    }
    if let Some(text_source) = args.text_source {
        map.insert("text_source".to_string(), json!(text_source.as_str()));
    }
    if let Some(output) = args.output {
        map.insert("output_path".to_string(), json!(output));
    }
    let result = tools::extract_template::call(&Value::Object(map));
    print_tool_result(result, args.json)
}

fn run_generate_document(args: GenerateDocumentArgs) -> Result<()> {
    let mut map = Map::new();
    map.insert("template_path".to_string(), json!(args.template));
    if let Some(data) = read_data(args.data.as_deref(), args.data_file.as_deref())? {
        map.insert("data".to_string(), data);
    }
    if let Some(behavior) = args.missing_field_behavior {
        map.insert("missing_field_behavior".to_string(), json!(behavior.as_str()));
    }
    if let Some(output) = args.output {
        map.insert("output_path".to_string(), json!(output));
    }
    let result = tools::generate_document::call(&Value::Object(map));
    print_tool_result(result, args.json)
}

fn run_inspect_template(args: InspectTemplateArgs) -> Result<()> {
    let mut map = Map::new();
    map.insert("template_path".to_string(), json!(args.template));
    let result = tools::inspect_template::call(&Value::Object(map));
    print_tool_result(result, args.json)
}

fn read_data(inline: Option<&str>, file: Option<&str>) -> Result<Option<Value>> {
    let text = match (inline, file) {
        (Some(inline), _) => inline.to_string(),
        (None, Some(file)) => {
            fs::read_to_string(file).with_context(|| format!("failed to read {file}"))?
        }
        (None, None) => return Ok(None),
    };
    let value = serde_json::from_str(&text).context("data must be a JSON object")?;
    Ok(Some(value))
}

fn build_input_args(input: &InputArgs) -> Map<String, Value> {
    let mut map = Map::new();
    if let Some(path) = &input.path {
        map.insert("path".to_string(), json!(path));
    }
    if let Some(base64) = &input.base64 {
        map.insert("base64".to_string(), json!(base64));
    }
    map
}

fn print_tool_result(result: Value, json_output: bool) -> Result<()> {
    let is_error = result
        .get("isError")
        .and_then(|value| value.as_bool())
        .unwrap_or(false);

    if is_error {
        let message = result
            .get("structuredContent")
            .and_then(|value| value.get("error"))
            .and_then(|value| value.get("message"))
            .and_then(|value| value.as_str())
            .unwrap_or("tool error");
        eprintln!("{message}");
        process::exit(1);
    }

    if json_output {
        let structured = result
            .get("structuredContent")
            .cloned()
            .unwrap_or_else(|| json!({}));
        let output = serde_json::to_string_pretty(&structured)?;
        println!("{output}");
        return Ok(());
    }

    let text = result
        .get("content")
        .and_then(|value| value.as_array())
        .and_then(|arr| arr.first())
        .and_then(|value| value.get("text"))
        .and_then(|value| value.as_str())
        .unwrap_or("");
    println!("{text}");
    Ok(())
}
