mod render;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clap::{Parser, Subcommand};
use serde::Serialize;
use study::conversation::{Conversation, DEFAULT_LANGUAGE, Draft, LANGUAGES};
use study::materials::GeneratedContent;
use study::resources::{ResourceCategory, sections};
use study::wire::{
    AidType, AidTypesRequest, CodeRequest, ContentRequest, ResourcesRequest, StudentLevel, StudyAidRequest,
};
use study::{ApiError, Endpoint, Method, Service, ServiceEndpoints};

const RESOURCES_FALLBACK: &str = "Failed to generate resources. Please try again.";
const CONTENT_FALLBACK: &str = "Failed to generate content";
const CODE_FALLBACK: &str = "Failed to generate code. Please try again.";
const STUDY_AID_FALLBACK: &str = "Failed to generate study aid. Please try again.";

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{message}")]
    Request {
        message: String,
        #[source]
        cause: ApiError,
    },
    #[error("http client setup failed: {0}")]
    Client(#[from] reqwest::Error),
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("terminal i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "vidyamitra-cli", about = "VidyaMitra study tools from the terminal")]
struct Cli {
    #[arg(long, env = "VIDYAMITRA_RESOURCES_URL")]
    resources_url: Option<String>,

    #[arg(long, env = "VIDYAMITRA_CHAT_URL")]
    chat_url: Option<String>,

    #[arg(long, env = "VIDYAMITRA_CONTENT_URL")]
    content_url: Option<String>,

    #[arg(long, env = "VIDYAMITRA_CODE_URL")]
    code_url: Option<String>,

    #[arg(long, env = "VIDYAMITRA_STUDY_AID_URL")]
    study_aid_url: Option<String>,

    #[arg(long, default_value_t = 120, help = "Per-request timeout in seconds")]
    timeout_secs: u64,

    #[arg(long, default_value_t = false, help = "Print raw JSON responses")]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn endpoints(&self) -> ServiceEndpoints {
        let flags = [
            (Service::Resources, &self.resources_url),
            (Service::Chat, &self.chat_url),
            (Service::Content, &self.content_url),
            (Service::Code, &self.code_url),
            (Service::StudyAid, &self.study_aid_url),
        ];
        ServiceEndpoints::from_lookup(|key| {
            flags.iter().find(|(service, _)| service.env_var() == key).and_then(|(_, value)| (*value).clone())
        })
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the study tools and the backend each one calls.
    Features,
    /// Find books, courses, websites and channels for a topic.
    Resources {
        #[arg(required = true, num_args = 1..)]
        topic: Vec<String>,
        #[arg(long, default_value = "all", value_parser = parse_category)]
        category: ResourceCategory,
    },
    /// Generate study material for a topic.
    Content {
        #[arg(required = true, num_args = 1..)]
        topic: Vec<String>,
        #[arg(long, default_value = "beginner", value_parser = parse_level)]
        level: StudentLevel,
        #[arg(long, help = "Write the material to this file instead of stdout")]
        output: Option<PathBuf>,
    },
    /// Generate code from a description.
    Code {
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,
    },
    /// Generate an exam-prep aid for a topic.
    Aid {
        #[arg(required = true, num_args = 1..)]
        topic: Vec<String>,
        #[arg(long, default_value = "cheat sheet", value_parser = parse_aid_type)]
        kind: AidType,
    },
    /// List the aid kinds the study-aid backend offers.
    AidTypes,
    /// Chat with the tutor. `/clear` resets the log, `/quit` exits.
    Chat {
        #[arg(long, default_value = DEFAULT_LANGUAGE, value_parser = parse_language)]
        language: String,
    },
}

fn parse_category(raw: &str) -> Result<ResourceCategory, String> {
    ResourceCategory::parse(raw).ok_or_else(|| {
        let known: Vec<_> = ResourceCategory::ALL.iter().map(|c| c.label().to_ascii_lowercase()).collect();
        format!("expected one of: {}", known.join(", "))
    })
}

fn parse_level(raw: &str) -> Result<StudentLevel, String> {
    StudentLevel::parse(raw).ok_or_else(|| "expected beginner, intermediate or advanced".to_owned())
}

fn parse_aid_type(raw: &str) -> Result<AidType, String> {
    AidType::parse(raw).ok_or_else(|| {
        let known: Vec<_> = AidType::ALL.iter().map(|a| a.as_str()).collect();
        format!("expected one of: {}", known.join(", "))
    })
}

fn parse_language(raw: &str) -> Result<String, String> {
    let code = raw.trim().to_ascii_lowercase();
    if LANGUAGES.iter().any(|l| l.code == code) {
        Ok(code)
    } else {
        let known: Vec<_> = LANGUAGES.iter().map(|l| l.code).collect();
        Err(format!("expected one of: {}", known.join(", ")))
    }
}

/// Typed access to the study backends.
struct Backends {
    http: reqwest::Client,
    endpoints: ServiceEndpoints,
}

impl Backends {
    fn new(endpoints: ServiceEndpoints, timeout: Duration) -> Result<Self, CliError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, endpoints })
    }

    async fn call<E: Endpoint>(&self, request: &E) -> Result<E::Response, ApiError> {
        request.validate()?;
        let url = self.endpoints.url_for::<E>();
        let builder = match E::METHOD {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url).json(request),
        };

        let response = builder.send().await.map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status.as_u16(), &body));
        }
        response.json::<E::Response>().await.map_err(|e| ApiError::Decode(e.to_string()))
    }
}

fn failed(fallback: &'static str) -> impl FnOnce(ApiError) -> CliError {
    move |cause| CliError::Request { message: cause.user_message(fallback), cause }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let backends = Backends::new(cli.endpoints(), Duration::from_secs(cli.timeout_secs))?;
    let json = cli.json;

    match cli.command {
        Command::Features => {
            print!("{}", render::features_table(&backends.endpoints));
            Ok(())
        }
        Command::Resources { topic, category } => {
            let request = ResourcesRequest { topic: topic.join(" ") };
            let response = backends.call(&request).await.map_err(failed(RESOURCES_FALLBACK))?;
            if json {
                return print_json(&response);
            }
            print!("{}", render::resources(response.learning_plan.as_deref(), &sections(&response, category)));
            Ok(())
        }
        Command::Content { topic, level, output } => {
            let topic = topic.join(" ");
            let request = ContentRequest::new(topic.clone(), level);
            let response = backends.call(&request).await.map_err(failed(CONTENT_FALLBACK))?;
            if json {
                return print_json(&response);
            }
            let material = GeneratedContent::new(topic, level, response);
            match output {
                Some(path) => {
                    std::fs::write(&path, material.download_text())
                        .map_err(|source| CliError::Write { path: path.clone(), source })?;
                    eprintln!("wrote {}", path.display());
                }
                None => println!("{}", material.download_text()),
            }
            Ok(())
        }
        Command::Code { prompt } => {
            let request = CodeRequest { prompt: prompt.join(" ") };
            let response = backends.call(&request).await.map_err(failed(CODE_FALLBACK))?;
            if json {
                return print_json(&response);
            }
            print!("{}", render::code(&response));
            Ok(())
        }
        Command::Aid { topic, kind } => {
            let request = StudyAidRequest { topic: topic.join(" "), aid_type: kind };
            let response = backends.call(&request).await.map_err(failed(STUDY_AID_FALLBACK))?;
            if json {
                return print_json(&response);
            }
            print!("{}", render::study_aid(&response));
            Ok(())
        }
        Command::AidTypes => {
            let response = backends.call(&AidTypesRequest).await.map_err(failed(STUDY_AID_FALLBACK))?;
            if json {
                return print_json(&response);
            }
            for aid_type in response.aid_types {
                println!("{aid_type}");
            }
            Ok(())
        }
        Command::Chat { language } => run_chat(&backends, language).await,
    }
}

async fn run_chat(backends: &Backends, language: String) -> Result<(), CliError> {
    let mut conversation = Conversation::default();
    let mut draft = Draft { language, ..Draft::default() };

    eprintln!("chatting in {}; /clear resets, /quit exits", study::conversation::language_name(&draft.language));
    prompt()?;

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        match ChatInput::parse(&line) {
            ChatInput::Quit => break,
            ChatInput::Clear => {
                conversation.clear();
                eprintln!("(conversation cleared)");
                prompt()?;
                continue;
            }
            ChatInput::Text => {}
        }

        // Every turn completes before the next line is read, so the only
        // possible rejection is a blank line.
        draft.text = line;
        let Ok(turn) = conversation.begin_send(&draft, now_ms()) else {
            prompt()?;
            continue;
        };
        draft.text.clear();

        let outcome = backends.call(&turn.request).await;
        if let Err(e) = &outcome {
            eprintln!("chat request failed: {e}");
        }
        conversation.complete(turn.ticket, outcome, now_ms());
        if let Some(reply) = conversation.messages().last() {
            println!("{}", render::chat_line(reply));
        }
        prompt()?;
    }
    Ok(())
}

/// What one line typed into `chat` asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChatInput {
    Quit,
    Clear,
    Text,
}

impl ChatInput {
    fn parse(line: &str) -> Self {
        match line.trim() {
            "/quit" => Self::Quit,
            "/clear" => Self::Clear,
            _ => Self::Text,
        }
    }
}

fn prompt() -> Result<(), CliError> {
    let mut stdout = io::stdout();
    write!(stdout, "> ")?;
    stdout.flush()?;
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn now_ms() -> f64 {
    let Ok(duration) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0.0;
    };
    duration.as_millis() as f64
}

fn print_json(value: &impl Serialize) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
