//! `voxarcade` terminal host.
//!
//! Stands in for the browser: each stdin line is a final transcript while the
//! session is listening. Lines starting with `:` are host controls.

#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[cfg(not(target_arch = "wasm32"))]
use tokio::io::{AsyncBufReadExt, BufReader};
#[cfg(not(target_arch = "wasm32"))]
use tokio::sync::mpsc;
#[cfg(not(target_arch = "wasm32"))]
use tokio::time::MissedTickBehavior;
#[cfg(not(target_arch = "wasm32"))]
use tracing::{debug, info, warn};
#[cfg(not(target_arch = "wasm32"))]
use tracing_subscriber::EnvFilter;

#[cfg(not(target_arch = "wasm32"))]
use voxarcade::arcade::{ActiveGame, Arcade};
#[cfg(not(target_arch = "wasm32"))]
use voxarcade::config::ArcadeConfig;
#[cfg(not(target_arch = "wasm32"))]
use voxarcade::games::event::GameEvent;
#[cfg(not(target_arch = "wasm32"))]
use voxarcade::games::simon::SimonPhase;
#[cfg(not(target_arch = "wasm32"))]
use voxarcade::games::time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use voxarcade::games::word_guess::WordPhase;
#[cfg(not(target_arch = "wasm32"))]
use voxarcade::games::GameKind;
#[cfg(not(target_arch = "wasm32"))]
use voxarcade::paths::AppPaths;
#[cfg(not(target_arch = "wasm32"))]
use voxarcade::progress::ProgressStore;
#[cfg(not(target_arch = "wasm32"))]
use voxarcade::sound::{SoundBoard, TraceSink};
#[cfg(not(target_arch = "wasm32"))]
use voxarcade::speech::{
    RecognitionOptions, Recognizer, RecognizerEvent, RecognizerFault, SessionSignal, SpeechError,
    SpeechSession,
};
#[cfg(not(target_arch = "wasm32"))]
use voxarcade::storage::{ChunkedStorage, FileStorage, KeyValueStore, MemoryStorage};

#[cfg(not(target_arch = "wasm32"))]
type HostArcade = Arcade<Box<dyn KeyValueStore>, TraceSink>;

/// Recognizer backed by stdin. While started, typed lines are delivered as
/// final transcripts through the same channel as lifecycle events.
#[cfg(not(target_arch = "wasm32"))]
struct StdinRecognizer {
    events: mpsc::UnboundedSender<RecognizerEvent>,
    running: bool,
}

#[cfg(not(target_arch = "wasm32"))]
impl StdinRecognizer {
    /// Queue `line` as a transcript. False when not running.
    fn hear(&self, line: String) -> bool {
        self.running && self.events.send(RecognizerEvent::Result(line)).is_ok()
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Recognizer for StdinRecognizer {
    fn is_supported(&self) -> bool {
        true
    }

    fn start(&mut self, options: &RecognitionOptions) -> Result<(), SpeechError> {
        self.events
            .send(RecognizerEvent::Started)
            .map_err(|e| SpeechError::StartFailed(e.to_string()))?;
        self.running = true;
        info!(locale = %options.locale, "listening on stdin");
        Ok(())
    }

    fn stop(&mut self) {
        if self.running {
            self.running = false;
            for event in [RecognizerEvent::Error(RecognizerFault::Aborted), RecognizerEvent::End] {
                if let Err(e) = self.events.send(event) {
                    debug!("recognizer event dropped on stop: {}", e);
                }
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() >= 2 && (args[1] == "--help" || args[1] == "-h" || args[1] == "help") {
        print_help();
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("voxarcade=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let paths = match AppPaths::new() {
        Ok(paths) => Some(paths),
        Err(e) => {
            warn!("no data directory ({}); progress will not persist", e);
            None
        }
    };

    let mut config = paths
        .as_ref()
        .map(|p| ArcadeConfig::load_or_default(&p.config_file()))
        .unwrap_or_default();
    config.apply_env();

    let opened = paths
        .as_ref()
        .map(|p| FileStorage::open(p.storage_file()));
    let store: Box<dyn KeyValueStore> = match opened {
        Some(Ok(file)) => {
            info!(path = %file.path().display(), "progress storage opened");
            Box::new(file)
        }
        Some(Err(e)) => {
            warn!("storage unavailable ({}); progress will not persist", e);
            Box::new(MemoryStorage::new())
        }
        None => Box::new(MemoryStorage::new()),
    };
    let storage =
        ChunkedStorage::with_layout(store, config.storage_prefix.clone(), config.chunk_size);
    let progress = ProgressStore::load(storage, config.storage_key.clone());

    let seed = config.seed.unwrap_or_else(clock_seed);
    let sound = SoundBoard::new(TraceSink::default(), config.muted);
    let mut arcade: HostArcade = Arcade::new(progress, sound, seed);

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let recognizer = StdinRecognizer {
        events: event_tx,
        running: false,
    };
    let mut session = SpeechSession::new(recognizer, config.recognition_options());

    let (line_tx, mut line_rx) = mpsc::unbounded_channel::<String>();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if line_tx.send(line).is_err() {
                break;
            }
        }
    });

    let mut ticker = tokio::time::interval(Duration::from_millis(config.tick_interval_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(seed, "voxarcade ready");
    print_menu(&arcade);
    forward(&mut arcade, session.start());

    loop {
        tokio::select! {
            line = line_rx.recv() => {
                let Some(line) = line else { break };
                let line = line.trim().to_string();
                if line.is_empty() {
                    continue;
                }
                if let Some(control) = line.strip_prefix(':') {
                    if !host_control(control, &mut arcade, &mut session) {
                        break;
                    }
                } else if !session.recognizer().hear(line) {
                    println!("(not listening; type :listen)");
                }
            }
            Some(event) = event_rx.recv() => {
                let signals = session.handle_event(event);
                let had_transcript = signals
                    .iter()
                    .any(|s| matches!(s, SessionSignal::Transcript(_)));
                forward(&mut arcade, signals);
                if had_transcript {
                    render(&arcade);
                }
            }
            _ = ticker.tick() => {
                let events = arcade.tick(Instant::now());
                if events.iter().any(|e| *e != GameEvent::Ignored) {
                    announce(&events);
                    render(&arcade);
                }
                print_notices(&mut arcade);
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    session.stop();
    arcade.sound_mut().unload_all();
    info!("bye");
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
fn print_help() {
    println!("voxarcade (voice-controlled arcade, terminal host)");
    println!("usage:");
    println!("  voxarcade");
    println!("  voxarcade --help");
    println!();
    println!("controls:");
    println!("  :play <game>   start a game ({})", game_labels());
    println!("  :menu          leave the current game");
    println!("  :listen        start voice control (stdin lines become transcripts)");
    println!("  :stop          stop voice control");
    println!("  :mute          toggle sound");
    println!("  :reset         reset progress for the current game");
    println!("  :quit          exit");
    println!();
    println!("env: RUST_LOG, VOXARCADE_SEED, VOXARCADE_MUTED, VOXARCADE_LOCALE");
}

#[cfg(not(target_arch = "wasm32"))]
fn game_labels() -> String {
    GameKind::ALL
        .iter()
        .map(|k| k.label())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(not(target_arch = "wasm32"))]
fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x5EED)
}

/// Returns false when the host should exit.
#[cfg(not(target_arch = "wasm32"))]
fn host_control(
    control: &str,
    arcade: &mut HostArcade,
    session: &mut SpeechSession<StdinRecognizer>,
) -> bool {
    let mut parts = control.split_whitespace();
    let name = parts.next().unwrap_or("");
    let now = Instant::now();

    match name {
        "quit" | "q" => return false,
        "play" => match parts.next().and_then(GameKind::from_label) {
            Some(kind) => {
                arcade.enter(kind, now);
                println!("== {} ==", kind.title());
                for (cmd, desc) in kind.commands() {
                    println!("  {cmd:<16} {desc}");
                }
                render(arcade);
            }
            None => println!("unknown game; try one of: {}", game_labels()),
        },
        "menu" => {
            arcade.leave();
            print_menu(arcade);
        }
        "listen" => forward(arcade, session.start()),
        "stop" => forward(arcade, session.stop()),
        "mute" => {
            let muted = arcade.sound_mut().toggle_mute();
            println!("sound {}", if muted { "off" } else { "on" });
        }
        "reset" => match arcade.active_kind() {
            Some(kind) => {
                arcade.reset_progress(kind, now);
                render(arcade);
            }
            None => println!("no game running"),
        },
        _ => println!("unknown control :{name} (see --help)"),
    }
    print_notices(arcade);
    true
}

#[cfg(not(target_arch = "wasm32"))]
fn forward(arcade: &mut HostArcade, signals: Vec<SessionSignal>) {
    for signal in signals {
        if let SessionSignal::Transcript(text) = &signal {
            println!("> {text}");
        }
        let before = arcade.session_points();
        if arcade.handle_signal(signal, Instant::now()).is_some() {
            let gained = arcade.session_points().saturating_sub(before);
            if gained > 0 {
                println!("+{gained}");
            }
        }
    }
    print_notices(arcade);
}

#[cfg(not(target_arch = "wasm32"))]
fn print_notices(arcade: &mut HostArcade) {
    for notice in arcade.drain_notices() {
        println!("{notice}");
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn announce(events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::ColorFlashed { color } => println!("  * {}", color.as_str().to_uppercase()),
            GameEvent::PlaybackDone => println!("  your turn"),
            GameEvent::CardsHidden => println!("  cards hidden"),
            GameEvent::WordMasked => println!("  word hidden; start guessing"),
            _ => {}
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn print_menu(arcade: &HostArcade) {
    println!("== Voice Games ==");
    for kind in GameKind::ALL {
        let p = arcade.progress(kind);
        println!(
            "  {:<12} {:<16} level {:>5}  best {:>5}  score {:>7}",
            kind.label(),
            kind.title(),
            p.current_level,
            p.highest_level,
            p.total_score
        );
    }
    println!("type :play <game> to start, --help for controls");
}

#[cfg(not(target_arch = "wasm32"))]
fn render(arcade: &HostArcade) {
    let Some(game) = arcade.active() else {
        return;
    };
    let p = arcade.progress(game.kind());
    let difficulty = arcade.stage().map(|s| s.difficulty().name()).unwrap_or("");
    println!(
        "-- level {} ({difficulty})  score {} --",
        p.current_level, p.total_score
    );
    if let Some(stats) = arcade.stats(game.kind()) {
        println!(
            "   rounds {}  won {:.0}%  recent {:.0}%  streak {} (best {})",
            stats.played,
            stats.win_rate() * 100.0,
            stats.recent_rate() * 100.0,
            stats.streak,
            stats.best_streak
        );
    }

    match game {
        ActiveGame::Adventure(g) => {
            let n = g.grid_size();
            for y in 0..n {
                let row: String = (0..n)
                    .map(|x| {
                        let here = voxarcade::games::adventure::Cell::new(x, y);
                        if g.position == here {
                            '@'
                        } else if g.target == here {
                            'G'
                        } else if g.obstacles().contains(&here) {
                            '#'
                        } else if g.power_ups().contains(&here) {
                            '*'
                        } else {
                            '.'
                        }
                    })
                    .collect();
                println!("  {row}");
            }
            println!("  time left: {}s", g.time_left());
        }
        ActiveGame::Memory(g) => {
            for row in g.cards().chunks(4) {
                let line: Vec<String> = row
                    .iter()
                    .map(|c| {
                        if c.face_up || c.matched {
                            format!("{:>3}", c.value)
                        } else {
                            format!("{:>3}", c.id + 1)
                        }
                    })
                    .collect();
                println!("  {}", line.join(" "));
            }
            println!("  matches: {}", g.matches);
        }
        ActiveGame::Simon(g) => {
            let phase = match g.phase() {
                SimonPhase::Playback { .. } => "watch",
                SimonPhase::Input => "repeat the sequence",
                SimonPhase::Pause { .. } => "well done",
            };
            println!(
                "  length {}  entered {}  ({phase})",
                g.sequence().len(),
                g.player_input().len()
            );
        }
        ActiveGame::Quiz(g) => {
            if let Some(q) = g.current_question() {
                println!("  [{}] {}", q.category, q.text);
                let answered = g.answer_for(g.current_index());
                for (i, option) in q.options.iter().enumerate() {
                    let mark = match answered {
                        Some(_) if i == q.correct => "+",
                        Some(a) if a == i => "x",
                        _ => " ",
                    };
                    println!("  {mark} {}. {option}", i + 1);
                }
            }
        }
        ActiveGame::WordGuess(g) => {
            let status = match g.phase() {
                WordPhase::Revealing { seconds_left, .. } => format!("memorise! {seconds_left}s"),
                WordPhase::Guessing => format!("attempts left: {}", g.attempts_left()),
                WordPhase::Won => "solved".to_string(),
                WordPhase::Lost => format!("out of attempts; the word was {}", g.word()),
            };
            println!("  {}   {status}", g.display());
        }
        ActiveGame::NumberGuess(g) => {
            println!("  {}  guesses: {:?}", g.hint().message(), g.guesses());
        }
    }
}
