use std::{
    io::{self, Write},
    path::PathBuf,
    thread,
    time::Duration,
};

use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::{rngs::StdRng, SeedableRng};
use sort_visualiser_core::{
    generate_history, generate_sequence, AppConfig, BarChart, Canvas, Frame, PlaybackController,
    PositionUpdate, RenderSink, SortMode, ToneBank, UiObserver,
};
use tracing_subscriber::EnvFilter;

const WAVE_STEP: Duration = Duration::from_millis(8);

fn main() -> sort_visualiser_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play { input, mute, height } => run_play(&input, mute, height),
        Commands::Inspect { input, frames } => run_inspect(&input, frames),
    }
}

fn run_play(input: &InputArgs, mute: bool, height: u16) -> sort_visualiser_core::Result<()> {
    let config = input.resolve()?;
    let values = build_values(&config);
    let muted = mute || config.audio.muted;
    tracing::info!(
        len = values.len(),
        mode = ?config.playback.mode,
        speed = config.playback.clamped_speed(),
        muted,
        "starting playback"
    );

    let terminal = Terminal::new(BarChart::new(usize::from(height)));
    let mut controller =
        PlaybackController::new(terminal, ToneBank::with_muted(muted), StepCounter)
            .with_speed(config.playback.clamped_speed());
    controller.load(&values, config.playback.mode);
    controller.play();

    while controller.is_running() {
        let Some(wait) = controller.next_wake() else {
            break;
        };
        thread::sleep(wait);
        controller.tick(wait);

        for tone in controller.audio_sink_mut().drain() {
            let samples = tone.render(config.audio.sample_rate);
            tracing::debug!(
                frequency = tone.frequency_hz,
                samples = samples.len(),
                duration_ms = tone.duration_ms,
                waveform = ?tone.waveform,
                "tone"
            );
        }
    }

    if let Some(history) = controller.history() {
        let summary = history.summary();
        tracing::info!(
            frames = summary.frames,
            comparisons = summary.comparisons,
            swaps = summary.swaps,
            tones = controller.audio_sink().played(),
            "playback finished"
        );
    }
    Ok(())
}

fn run_inspect(input: &InputArgs, frames: bool) -> sort_visualiser_core::Result<()> {
    let config = input.resolve()?;
    let values = build_values(&config);
    tracing::info!(len = values.len(), mode = ?config.playback.mode, "generating history");

    let history = generate_history(&values, config.playback.mode);
    let json = if frames {
        serde_json::to_string_pretty(&history)?
    } else {
        serde_json::to_string_pretty(&history.summary())?
    };
    println!("{json}");
    Ok(())
}

fn build_values(config: &AppConfig) -> Vec<u32> {
    if let Some(values) = &config.array.values {
        return values.clone();
    }

    let size = config.array.clamped_size();
    match config.array.seed {
        Some(seed) => generate_sequence(size, &mut StdRng::seed_from_u64(seed)),
        None => generate_sequence(size, &mut StdRng::from_entropy()),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

/// Render sink that redraws the chart on stdout.
struct Terminal {
    canvas: Canvas,
}

impl Terminal {
    fn new(chart: BarChart) -> Self {
        Self {
            canvas: Canvas::new(chart),
        }
    }

    fn draw(lines: &[String]) {
        let mut out = io::stdout().lock();
        // Drawing is best effort; a closed stdout must not stop playback.
        let _ = write!(out, "\x1b[2J\x1b[H");
        for line in lines {
            let _ = writeln!(out, "{line}");
        }
        let _ = out.flush();
    }
}

impl RenderSink for Terminal {
    fn render_frame(&mut self, frame: &Frame) {
        self.canvas.render_frame(frame);
        Self::draw(self.canvas.lines());
    }

    fn signal_run_complete(&mut self) {
        self.canvas.signal_run_complete();
        for picture in self.canvas.wave() {
            Self::draw(&picture);
            thread::sleep(WAVE_STEP);
        }
        Self::draw(self.canvas.lines());
    }
}

/// Prints the step counter under the chart.
struct StepCounter;

impl UiObserver for StepCounter {
    fn on_position(&mut self, update: PositionUpdate) {
        println!("step {}/{}", update.cursor + 1, update.total);
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Bubble sort visualiser", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Animate a sort in the terminal.
    Play {
        #[command(flatten)]
        input: InputArgs,
        /// Silence the tone cues.
        #[arg(long)]
        mute: bool,
        /// Height of the bar chart in rows.
        #[arg(long, default_value_t = 12, value_parser = clap::value_parser!(u16).range(1..=200))]
        height: u16,
    },
    /// Print the generated history as JSON.
    Inspect {
        #[command(flatten)]
        input: InputArgs,
        /// Emit every frame instead of the summary.
        #[arg(long)]
        frames: bool,
    },
}

#[derive(Args, Debug)]
struct InputArgs {
    /// JSON configuration file; flags override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Explicit comma separated input, e.g. `5,3,8,1`.
    #[arg(long, value_delimiter = ',')]
    values: Option<Vec<u32>>,
    /// Number of random values to sort (5..=100).
    #[arg(short, long)]
    size: Option<usize>,
    /// Seed for the random values.
    #[arg(long)]
    seed: Option<u64>,
    /// Bubble sort variant.
    #[arg(short, long, value_enum)]
    mode: Option<ModeArg>,
    /// Playback speed dial (1..=100).
    #[arg(long)]
    speed: Option<u8>,
}

impl InputArgs {
    fn resolve(&self) -> sort_visualiser_core::Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_path(path)?,
            None => AppConfig::default(),
        };

        if let Some(values) = &self.values {
            config.array.values = Some(values.clone());
        }
        if let Some(size) = self.size {
            config.array.size = size;
        }
        if let Some(seed) = self.seed {
            config.array.seed = Some(seed);
        }
        if let Some(mode) = self.mode {
            config.playback.mode = mode.into();
        }
        if let Some(speed) = self.speed {
            config.playback.speed = speed;
        }

        config.validate()?;
        Ok(config)
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Plain,
    EarlyExit,
}

impl From<ModeArg> for SortMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Plain => SortMode::Plain,
            ModeArg::EarlyExit => SortMode::EarlyExit,
        }
    }
}
