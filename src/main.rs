//! docx-pager CLI
//!
//! Lays a document out with the reference flow renderer and prints its page
//! breaks as JSON. The main interface is through WASM bindings.

use clap::Parser;
use docx_pager::{
    CollectingSink, DiagnosticEntry, Document, Error, FlowLayout, HeaderFooterRepository,
    HeaderFooterStore, PageBreakCalculator, Pagination, PaginationConfig, SectionResolver,
    SectionSettings,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Compute page breaks for an editor document
#[derive(Parser, Debug)]
#[command(name = "docx-pager", version, about)]
struct Args {
    /// Document tree as editor JSON
    doc: PathBuf,

    /// Header/footer store (`headers`, `footers`, `headerIds`, `footerIds`)
    #[arg(long)]
    sections: Option<PathBuf>,

    /// Pagination config (`params`, `sections`, `flow`)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Include detector diagnostics in the output
    #[arg(long)]
    diagnostics: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Serialize)]
struct Output {
    #[serde(flatten)]
    pagination: Pagination,
    #[serde(skip_serializing_if = "Option::is_none")]
    diagnostics: Option<Vec<DiagnosticEntry>>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("docx-pager: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Error> {
    let doc = Document::from_json(&fs::read_to_string(&args.doc)?)?;
    let config: PaginationConfig = match &args.config {
        Some(path) => read_json(path)?,
        None => PaginationConfig::default(),
    };
    let store: HeaderFooterStore = match &args.sections {
        Some(path) => read_json(path)?,
        None => HeaderFooterStore::new(),
    };

    let mut settings = config.sections;
    let from_store = SectionSettings::from_store(&store);
    settings.different_first_page |= from_store.different_first_page;
    settings.different_odd_even |= from_store.different_odd_even;

    let mut repository = HeaderFooterRepository::new(store);
    let measured: Vec<_> = repository
        .list(None)
        .into_iter()
        .filter_map(|record| {
            FlowLayout::measure_content(&record.content_json, &config.flow)
                .map(|height| (record.id.clone(), height))
        })
        .collect();
    for (id, height) in measured {
        repository.set_height(&id, height);
    }

    let layout = FlowLayout::new(&doc, config.flow.clone());
    log::info!(
        "Laid out {} positions in a {:.1}px column",
        layout.content_size(),
        layout.height()
    );

    let sink = CollectingSink::new();
    let mut resolver = SectionResolver::new(&repository, settings);
    let pagination = PageBreakCalculator::new()
        .with_diagnostics(&sink)
        .calculate(&doc, &layout, &config.params, &mut resolver);

    let output = Output {
        pagination,
        diagnostics: args.diagnostics.then(|| sink.take()),
    };
    let json = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{json}");
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, Error> {
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}
