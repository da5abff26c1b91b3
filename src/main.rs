//! buzzclock demo — run a round through the speakers, or render a tone to WAV.
//!
//! Usage:
//!   cargo run -- [seconds]
//!   cargo run -- [seconds] --sound metronome
//!   cargo run -- --sound buzzer --wav buzzer.wav

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use std::{env, fs};

use bz_core::{RampConfig, ToneProfile};
use bz_engine::ToneSynth;
use bz_round::{samples_to_wav, AudioEngine, RoundTimer, TonePlayer};

const WAV_SAMPLE_RATE: u32 = 44_100;

fn main() {
    let args: Vec<String> = env::args().collect();

    let sound_name = flag_value(&args, "--sound").unwrap_or_else(|| "beep".into());
    let Some(profile) = profile_by_name(&sound_name) else {
        eprintln!("Unknown sound: {}", sound_name);
        eprintln!("Available: beep, metronome, chime, siren, buzzer, ready");
        std::process::exit(1);
    };

    if let Some(path) = flag_value(&args, "--wav") {
        render_to_wav(&profile, &path);
        return;
    }

    let seconds = args
        .get(1)
        .filter(|a| !a.starts_with("--"))
        .map(|a| {
            a.parse().unwrap_or_else(|_| {
                eprintln!("Usage: buzzclock [seconds] [--sound name] [--wav output.wav]");
                std::process::exit(1);
            })
        })
        .unwrap_or(30);

    run_round(seconds, profile);
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn profile_by_name(name: &str) -> Option<ToneProfile> {
    match name {
        "beep" => Some(ToneProfile::beep()),
        "metronome" => Some(ToneProfile::metronome()),
        "chime" => Some(ToneProfile::chime()),
        "siren" => Some(ToneProfile::siren()),
        "buzzer" => Some(ToneProfile::buzzer()),
        "ready" => Some(ToneProfile::ready_blip()),
        _ => None,
    }
}

fn render_to_wav(profile: &ToneProfile, path: &str) {
    let mut synth = ToneSynth::new(WAV_SAMPLE_RATE);
    let samples = synth.render(profile);
    let wav = samples_to_wav(&samples, WAV_SAMPLE_RATE);

    fs::write(path, &wav).unwrap_or_else(|e| {
        eprintln!("Failed to write {}: {}", path, e);
        std::process::exit(1);
    });

    println!(
        "Wrote {} ({} samples, {:.0} ms at {} Hz)",
        path,
        samples.len(),
        samples.len() as f64 * 1_000.0 / WAV_SAMPLE_RATE as f64,
        WAV_SAMPLE_RATE
    );
}

fn run_round(seconds: u64, profile: ToneProfile) {
    let engine = AudioEngine::new();
    let mut player = TonePlayer::new(engine);
    if let Err(e) = player.preload(&profile) {
        eprintln!("Audio unavailable ({}), running silent", e);
    }
    let _ = player.play(&ToneProfile::ready_blip());

    let mut timer = RoundTimer::new(Duration::from_secs(seconds), RampConfig::default());
    timer.set_alert_profile(profile);
    timer.attach_player(player);

    let done = Arc::new(AtomicBool::new(false));
    let finished = done.clone();
    timer.on_complete(move || finished.store(true, Ordering::Relaxed));
    timer.on_tick(|remaining| {
        print!("\r{:>4}s remaining ", remaining);
        let _ = std::io::stdout().flush();
    });

    println!("Round: {} seconds", seconds);
    timer.start();

    while !done.load(Ordering::Relaxed) {
        std::thread::sleep(Duration::from_millis(50));
    }
    // Let the buzzer ring out before the process exits
    std::thread::sleep(Duration::from_millis(900));
    println!("\rTime!            ");
}
