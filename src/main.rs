//! talent-fit: score a resume against a job description per keyword category

use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::process;
use talent_fit::cli::{self, Cli, Commands, ConfigAction};
use talent_fit::config::{Config, OutputFormat};
use talent_fit::error::{Result, TalentFitError, EXTRACTION_FAILED_MESSAGE};
use talent_fit::input::InputManager;
use talent_fit::output::formatter::{save_report_to_file, ReportGenerator};
use talent_fit::output::report::Report;
use talent_fit::processing::analyzer::{ensure_resume_text, AnalysisEngine};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, cli.config).await {
        if e.is_extraction_failure() {
            eprintln!("❌ {}", EXTRACTION_FAILED_MESSAGE);
        } else {
            error!("Command failed: {}", e);
        }
        process::exit(1);
    }
}

async fn run_command(command: Commands, config: Config, config_file: Option<PathBuf>) -> Result<()> {
    match command {
        Commands::Analyze {
            resume,
            job,
            format,
            save,
            export,
            backend,
            detailed,
        } => {
            cli::validate_file_extension(&resume, &["pdf", "txt", "md"])
                .map_err(|e| TalentFitError::InvalidInput(format!("Resume file: {}", e)))?;

            if let Some(job) = &job {
                cli::validate_file_extension(job, &["txt", "md"]).map_err(|e| {
                    TalentFitError::InvalidInput(format!("Job description file: {}", e))
                })?;
            }

            let output_format = match format {
                Some(format) => {
                    cli::parse_output_format(&format).map_err(TalentFitError::InvalidInput)?
                }
                None => config.output.format,
            };

            let backend = match backend {
                Some(backend) => cli::parse_backend(&backend).map_err(TalentFitError::InvalidInput)?,
                None => config.similarity.backend,
            };

            let detailed = detailed || config.output.detailed;
            // Progress lines would corrupt machine-readable output on stdout
            let chatty = output_format == OutputFormat::Console;

            if chatty {
                println!("🚀 Career fit analysis");
                println!("📄 Resume: {}", resume.display());
                match &job {
                    Some(job) => println!("💼 Job Description: {}", job.display()),
                    None => println!("💼 Job Description: configured default"),
                }
            }

            let mut input_manager = InputManager::new();

            let resume_text = input_manager.extract_text(&resume).await?;
            ensure_resume_text(&resume_text)?;

            let job_text = match &job {
                Some(path) => input_manager.extract_text(path).await?,
                None => config.job.description.clone(),
            };

            info!(
                "Resume text: {} chars, job description: {} chars",
                resume_text.len(),
                job_text.len()
            );

            let analysis_engine = AnalysisEngine::with_backend(backend, &config).await;
            if chatty {
                println!("🧠 Similarity backend: {}", analysis_engine.backend_name());
                println!("\n🔍 Scoring {} categories...", config.categories.len());
            }

            let analysis = analysis_engine.analyze(&config.categories, &resume_text, &job_text)?;

            let resume_name = resume
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| resume.display().to_string());
            let report = Report::from_analysis(&analysis, &resume_name);

            let use_colors = config.output.color_output && save.is_none();
            let generator = ReportGenerator::with_options(use_colors, detailed);
            let content = generator.generate_report(&report, &output_format)?;

            match &save {
                Some(path) => {
                    save_report_to_file(&content, path)?;
                    if chatty {
                        println!("💾 Report saved to: {}", path.display());
                    } else {
                        info!("Report saved to: {}", path.display());
                    }
                }
                None => println!("{}", content),
            }

            if let Some(export_path) = export {
                let export_path = export_path
                    .unwrap_or_else(|| PathBuf::from(&config.output.export_filename));
                generator.export_csv(&report, &export_path)?;
                if chatty {
                    println!("📥 CSV export written to: {}", export_path.display());
                }
                info!(
                    "CSV export ({}) written to: {}",
                    report.metadata.export_mime_type,
                    export_path.display()
                );
            }
        }

        Commands::Categories => {
            println!("📚 Configured Categories\n");
            for category in &config.categories {
                println!(
                    "  • {} (weight {:.1}, strong at {:.0}%)",
                    category.name, category.weight, category.threshold
                );
                let keywords: Vec<String> = category
                    .keywords()
                    .into_iter()
                    .map(|(tier, keyword)| format!("{} [{}]", keyword, tier))
                    .collect();
                println!("    {}", keywords.join(", "));
            }
        }

        Commands::Config { action } => {
            let config_path = config_file.clone().unwrap_or_else(Config::config_path);

            match action {
                Some(ConfigAction::Show) | None => {
                    println!("⚙️  Current Configuration\n");
                    println!("File: {}", config_path.display());
                    println!("Similarity Backend: {:?}", config.similarity.backend);
                    println!("Embedding Model: {}", config.similarity.embedding_model);
                    println!("Include Bigrams: {}", config.similarity.include_bigrams);
                    println!("\nScoring Policy:");
                    println!("  Similarity weight: {:.2}", config.scoring.similarity_weight);
                    println!("  Coverage weight: {:.2}", config.scoring.coverage_weight);
                    println!("  Max repetitions: {}", config.scoring.max_repetitions);
                    println!(
                        "  Phrase bonus: {:.1} per match, capped at {:.1}",
                        config.scoring.phrase_bonus_per_match, config.scoring.phrase_bonus_cap
                    );
                    println!("\nOutput:");
                    println!("  Format: {:?}", config.output.format);
                    println!("  Export file: {}", config.output.export_filename);
                    println!("\nCategories: {}", config.categories.len());
                }

                Some(ConfigAction::Path) => {
                    println!("{}", config_path.display());
                }

                Some(ConfigAction::Reset) => {
                    println!("🔄 Resetting configuration to defaults...");
                    match &config_file {
                        Some(path) => Config::default().save_to(path)?,
                        None => {
                            Config::reset()?;
                        }
                    }
                    println!("✅ Configuration reset successfully!");
                }
            }
        }
    }

    Ok(())
}
