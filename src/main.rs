use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use story_studio::app::App;
use story_studio::models::{AspectRatio, Config, Location};
use story_studio::studio::ContentMode;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "story-studio")]
#[command(about = "Produce scenes, storyboards, scripts and narration for a news story")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a scene video (Veo).
    Video {
        prompt: String,
        /// 16:9 or 9:16.
        #[arg(long, default_value = "16:9", value_parser = parse_aspect_ratio)]
        aspect_ratio: AspectRatio,
        /// Optional starting image.
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Generate a storyboard still (Imagen).
    Image { prompt: String },
    /// Write a short news script about a topic.
    Script { topic: String },
    /// Answer with Google Search grounding.
    Search { prompt: String },
    /// Answer with Google Maps grounding near a location.
    Maps {
        prompt: String,
        #[arg(long, requires = "lng", allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lng: Option<f64>,
    },
    /// Describe or question a video file.
    Analyze { video: PathBuf, prompt: String },
    /// Synthesize narration to a WAV file.
    Narrate { text: String },
    /// Chat with the live report desk (reads lines from stdin).
    Live,
}

fn parse_aspect_ratio(input: &str) -> std::result::Result<AspectRatio, String> {
    input.parse::<AspectRatio>().map_err(|e| e.to_string())
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

async fn run(app: &mut App, command: Command) -> Result<()> {
    let saved = match command {
        Command::Video {
            prompt,
            aspect_ratio,
            image,
        } => app
            .generate_video(&prompt, aspect_ratio, image.as_deref())
            .await
            .context("video generation failed")?,
        Command::Image { prompt } => app.generate_image(&prompt).await?,
        Command::Script { topic } => {
            app.generate_content(ContentMode::Script, &topic, None)
                .await?
        }
        Command::Search { prompt } => {
            app.generate_content(ContentMode::Search, &prompt, None)
                .await?
        }
        Command::Maps { prompt, .. } => {
            app.generate_content(ContentMode::Maps, &prompt, None)
                .await?
        }
        Command::Analyze { video, prompt } => {
            app.generate_content(ContentMode::Video, &prompt, Some(&video))
                .await?
        }
        Command::Narrate { text } => app.narrate(&text).await?,
        Command::Live => {
            run_live(app).await?;
            app.save_transcript()?
        }
    };

    print_lines(&app.render());
    println!("Saved to {}", saved.display());
    Ok(())
}

async fn run_live(app: &mut App) -> Result<()> {
    // Blank input mounts the desk without sending anything.
    app.live_send("").await?;
    print_lines(&app.render());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("You: ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.eq_ignore_ascii_case("/quit") {
            break;
        }
        if let Some(reply) = app.live_send(line).await? {
            println!("Desk: {}", reply);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "story_studio=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting story-studio");

    let args = CliArgs::parse();

    let mut config = Config::from_env().context("invalid configuration")?;
    if let Command::Maps {
        lat: Some(latitude),
        lng: Some(longitude),
        ..
    } = &args.command
    {
        config.location = Some(Location {
            latitude: *latitude,
            longitude: *longitude,
        });
    }

    let mut app = match App::from_config(config).await {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    let shutdown = app.shutdown_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; cancelling in-flight work");
            shutdown.cancel();
        }
    });

    match run(&mut app, args.command).await {
        Ok(()) => {
            info!("Done");
            Ok(())
        }
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    }
}
