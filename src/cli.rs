//! Minimal CLI: definition → (schema | check)
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context as _, bail};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;
use serde_json::Value;
use tracing::{debug, info};

use json_caster::{CastResult, Caster, Context, Definition};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// build a caster from a JSON definition, then print its JSON schema or check documents against it
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// derive and print the JSON schema of a caster definition
    Schema(SchemaOut),
    /// cast every input document and report the verdicts
    Check(CheckRun),
}

#[derive(Args, Debug, Clone)]
struct DefinitionSettings {
    /// caster definition (.json)
    #[arg(long, short)]
    definition: PathBuf,
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /data/items/0/payload)
    #[arg(long)]
    json_pointer: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct SchemaOut {
    #[command(flatten)]
    definition_settings: DefinitionSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct CheckRun {
    #[command(flatten)]
    definition_settings: DefinitionSettings,

    #[command(flatten)]
    input_settings: InputSettings,

    /// only print invalid documents
    #[arg(long, short)]
    quiet: bool,
}

/// One input document, labelled by where it came from.
struct Document {
    label: String,
    value: Value,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl DefinitionSettings {
    fn load_caster(&self) -> anyhow::Result<Caster> {
        let source = std::fs::read(&self.definition)
            .with_context(|| format!("failed to read definition {}", self.definition.display()))?;
        let definition = Definition::from_json_slice(&source)
            .with_context(|| format!("failed to parse definition {}", self.definition.display()))?;
        let caster = definition
            .build()
            .with_context(|| format!("invalid caster definition {}", self.definition.display()))?;
        debug!(definition = %self.definition.display(), "caster built");
        Ok(caster)
    }
}

impl InputSettings {
    fn load_documents(&self) -> anyhow::Result<Vec<Document>> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;

        let mut documents = Vec::new();
        for source_path in source_paths {
            let source_path_str = source_path.to_string_lossy().to_string();
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read source file {source_path_str}"))?;

            if self.ndjson {
                for (line_no, line) in source.lines().enumerate() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let label = format!("{source_path_str}:{}", line_no + 1);
                    let value = serde_json::from_str::<Value>(line)
                        .with_context(|| format!("failed to parse JSON line ({label})"))?;
                    documents.push(self.select(label, value)?);
                }
            } else {
                let value = serde_json::from_str::<Value>(&source)
                    .with_context(|| format!("failed to parse JSON source file ({source_path_str})"))?;
                documents.push(self.select(source_path_str, value)?);
            }
        }
        info!(count = documents.len(), "documents loaded");
        Ok(documents)
    }

    fn select(&self, label: String, value: Value) -> anyhow::Result<Document> {
        let Some(pointer) = self.json_pointer.as_deref() else {
            return Ok(Document { label, value });
        };
        match value.pointer(pointer) {
            Some(node) => Ok(Document { value: node.clone(), label }),
            None => bail!("JSON pointer {pointer} does not resolve in {label}"),
        }
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> anyhow::Result<ExitCode> {
        match &self.cmd {
            Command::Schema(target) => {
                let caster = target.definition_settings.load_caster()?;
                let schema = caster.to_json_schema().context("failed to derive JSON schema")?;
                let schema_src = serde_json::to_string_pretty(&schema.into_value())?;
                write_output(target.out.as_deref(), &schema_src)?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Check(target) => {
                let caster = target.definition_settings.load_caster()?;
                let documents = target.input_settings.load_documents()?;

                // one fresh context per document, the tree itself is shared
                let verdicts: Vec<CastResult> = documents
                    .par_iter()
                    .map(|doc| caster.cast(&doc.value, &mut Context::new()))
                    .collect();

                let mut invalid = 0usize;
                for (doc, verdict) in documents.iter().zip(&verdicts) {
                    match verdict {
                        CastResult::Valid(_) => {
                            if !target.quiet {
                                println!("{} {}", "valid".green().bold(), doc.label);
                            }
                        }
                        CastResult::Invalid(errors) => {
                            invalid += 1;
                            println!("{} {}", "invalid".red().bold(), doc.label);
                            println!("{}", serde_json::to_string_pretty(errors)?);
                        }
                    }
                }

                let summary = format!("{} of {} documents valid", documents.len() - invalid, documents.len());
                if invalid == 0 {
                    eprintln!("{}", summary.green());
                    Ok(ExitCode::SUCCESS)
                } else {
                    eprintln!("{}", summary.yellow());
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn write_output(out: Option<&Path>, contents: &str) -> anyhow::Result<()> {
    let Some(out) = out else {
        println!("{contents}");
        return Ok(());
    };
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(out, contents).with_context(|| format!("failed to write {}", out.display()))
}

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                // Pattern was explicitly a glob but matched nothing -> surface as an error
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_check_invocation() {
        let cli = CommandLineInterface::try_parse_from([
            "json-caster", "check", "-d", "def.json", "-i", "a.json", "b/*.json", "--ndjson",
        ])
        .unwrap();
        match cli.cmd {
            Command::Check(run) => {
                assert_eq!(run.input_settings.input, vec!["a.json", "b/*.json"]);
                assert!(run.input_settings.ndjson);
                assert_eq!(run.definition_settings.definition, PathBuf::from("def.json"));
            }
            other => panic!("expected check, got {other:?}"),
        }
    }

    #[test]
    fn literal_paths_pass_through() {
        let paths = resolve_file_path_patterns(["does/not/exist.json"]).unwrap();
        assert_eq!(paths, vec![PathBuf::from("does/not/exist.json")]);
    }

    #[test]
    fn json_pointer_selects_subnode() {
        let settings = InputSettings {
            ndjson: false,
            json_pointer: Some("/data/0".into()),
            input: vec![],
        };
        let doc = settings.select("x".into(), serde_json::json!({"data": [7]})).unwrap();
        assert_eq!(doc.value, serde_json::json!(7));
        assert!(settings.select("y".into(), serde_json::json!({})).is_err());
    }
}
