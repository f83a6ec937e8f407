use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use careerpath::config::Config;
use careerpath::cv::{load_form, save_form, CvClient, CvError, CvForm};
use careerpath::flows::{CareerGuidance, CareerRecommendations, FlowPayload, InterviewQuestionSet};
use careerpath::render::Render;
use careerpath::transport::{ReqwestTransport, Transport};
use careerpath::{GuidanceRequestController, RequestState};

#[derive(Parser, Debug)]
#[command(name = "careerpath", version, about = "Career guidance, interview prep and CV tools")]
struct Cli {
    /// Backend base URL; overrides CAREERPATH_BASE_URL
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Automatic retries for network and server failures
    #[arg(long, global = true, default_value_t = 0)]
    retries: u32,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Key skills, career paths, certifications and trends for a field of study
    Guidance {
        #[arg(required = true, num_args = 1..)]
        field: Vec<String>,
    },
    /// Career recommendations for a program
    Recommend {
        #[arg(required = true, num_args = 1..)]
        program: Vec<String>,
    },
    /// Common interview questions with tips for a role
    Questions {
        #[arg(required = true, num_args = 1..)]
        role: Vec<String>,
    },
    /// Generate a CV from a JSON form
    Cv { form: PathBuf },
    /// Draft the summary paragraph of a JSON form
    Summary {
        form: PathBuf,
        /// Store the generated summary back into the form file
        #[arg(long)]
        write: bool,
    },
    /// Write a blank CV form to fill in
    Template { form: PathBuf },
    /// Show a text preview of a JSON form
    Preview { form: PathBuf },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = Config::from_env()?.with_base_url(cli.base_url.clone());

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("careerpath v{}", env!("CARGO_PKG_VERSION"));
    if config.base_url.is_none() {
        warn!("CAREERPATH_BASE_URL is not set");
    }

    let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new()?);

    let ok = match cli.command {
        Command::Guidance { field } => {
            run_flow::<CareerGuidance>(transport, &config, &field.join(" "), cli.retries).await
        }
        Command::Recommend { program } => {
            run_flow::<CareerRecommendations>(transport, &config, &program.join(" "), cli.retries)
                .await
        }
        Command::Questions { role } => {
            run_flow::<InterviewQuestionSet>(transport, &config, &role.join(" "), cli.retries).await
        }
        Command::Cv { form } => {
            let client = CvClient::from_config(transport, &config);
            let cv_form = load_form(&form)?;
            with_retries(cli.retries, || client.generate_cv(&cv_form))
                .await
                .map(|cv| println!("{}", cv.render()))
                .map_err(report_cv_error)
                .is_ok()
        }
        Command::Summary { form, write } => {
            let client = CvClient::from_config(transport, &config);
            let mut cv_form = load_form(&form)?;
            let result = with_retries(cli.retries, || client.generate_summary(&cv_form)).await;
            match result {
                Ok(summary) => {
                    println!("{summary}");
                    if write {
                        cv_form.apply_summary(summary);
                        save_form(&form, &cv_form)?;
                        info!("Summary written to {}", form.display());
                    }
                    true
                }
                Err(e) => {
                    report_cv_error(e);
                    false
                }
            }
        }
        Command::Preview { form } => {
            print!("{}", load_form(&form)?.render());
            true
        }
        Command::Template { form } => {
            save_form(&form, &CvForm::new())?;
            println!("Blank CV form written to {}", form.display());
            true
        }
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Submits one flow request, retrying retryable failures with exponential
/// backoff (1s, 2s, 4s, ...). Returns whether it ended in success.
async fn run_flow<P: FlowPayload + Render>(
    transport: Arc<dyn Transport>,
    config: &Config,
    input: &str,
    retries: u32,
) -> bool {
    let controller = GuidanceRequestController::<P>::from_config(transport, config);
    controller.submit(input).await;

    let mut attempt = 0;
    loop {
        match controller.state() {
            RequestState::Succeeded(payload) => {
                print!("{}", payload.render());
                return true;
            }
            RequestState::Failed(error) if error.retryable && attempt < retries => {
                attempt += 1;
                eprintln!("{}", error.render());
                backoff(attempt).await;
                controller.retry().await;
            }
            RequestState::Failed(error) => {
                eprintln!("{}", error.render());
                return false;
            }
            RequestState::Idle | RequestState::Pending => return false,
        }
    }
}

/// Re-runs a CV call while it fails with a retryable error.
async fn with_retries<T, F, Fut>(retries: u32, mut call: F) -> Result<T, CvError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, CvError>>,
{
    let mut attempt = 0;
    loop {
        match call().await {
            Err(CvError::Request(error)) if error.retryable && attempt < retries => {
                attempt += 1;
                eprintln!("{}", error.render());
                backoff(attempt).await;
            }
            result => return result,
        }
    }
}

async fn backoff(attempt: u32) {
    let delay = Duration::from_millis(1000 * (1 << (attempt - 1).min(5)));
    warn!("Retry {} after {}ms...", attempt, delay.as_millis());
    tokio::time::sleep(delay).await;
}

fn report_cv_error(error: CvError) {
    match error {
        CvError::InvalidForm(errors) => eprint!("{}", errors.render()),
        CvError::Request(error) => eprintln!("{}", error.render()),
    }
}
