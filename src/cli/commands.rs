//! CLI command implementations

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

use crate::analysis::{
    color_of, icon_of, mood_label, EmotionAnalysis, EmotionAnalyzer, PeriodStatistics,
    StatsPeriod,
};
use crate::cli::args::{ConfigCommand, EntryCommand};
use crate::config::Settings;
use crate::recording::{CpalDevices, MediaKind, Recorder};
use crate::storage::{period_statistics, Database, EntryStore, JournalEntry};
use crate::transcription::TranscriptionClient;
use crate::upload::{daily_folder, MediaUploadPipeline};
use crate::voice::{VoiceAnalysis, VoiceEntryPipeline};

/// Analyze a piece of text and print the result
pub fn analyze(text: &str, json: bool) -> Result<()> {
    let analysis = EmotionAnalyzer::default().analyze_text(text);

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        print_analysis(&analysis);
    }

    Ok(())
}

/// Handle entry subcommands
pub fn entry_command(settings: &Settings, cmd: EntryCommand) -> Result<()> {
    let db = Database::open(settings)?;
    let user = settings.general.user_id.as_str();

    match cmd {
        EntryCommand::Save { date, mood, note } => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let analyzer = EmotionAnalyzer::default();
            let mut entry = JournalEntry::new(date, mood, &note)?.analyzed(&analyzer);

            // Keep an attached clip when the day is rewritten
            if let Some(existing) = db.get(user, date)? {
                entry.media_url = existing.media_url;
            }

            db.put(user, &entry)?;
            println!(
                "Saved entry for {} (mood {}/10, {})",
                date,
                mood,
                entry_emotion(&entry)
            );
        }
        EntryCommand::Show { date } => {
            let entry = db
                .get(user, date)?
                .with_context(|| format!("No entry for {}", date))?;

            println!("Date: {}", entry.date);
            println!("Mood: {}/10 ({})", entry.mood_score, mood_label(entry.mood_score));
            if !entry.note.is_empty() {
                println!("Note: {}", entry.note);
            }
            if let Some(url) = &entry.media_url {
                println!("Media: {}", url);
            }
            if let Some(analysis) = &entry.emotion_analysis {
                println!();
                print_analysis(analysis);
            }
        }
        EntryCommand::List => {
            let entries = db.list_all(user)?;

            if entries.is_empty() {
                println!("No entries found");
                return Ok(());
            }

            println!("{:<12} {:<6} {:<14} {}", "Date", "Mood", "Emotion", "Note");
            println!("{}", "-".repeat(65));

            for entry in entries {
                println!(
                    "{:<12} {:<6} {:<14} {}",
                    entry.date,
                    entry.mood_score,
                    entry_emotion(&entry),
                    truncate(&entry.note, 30)
                );
            }
        }
        EntryCommand::Dates => {
            for date in db.marked_dates(user)? {
                println!("{}", date);
            }
        }
        EntryCommand::Delete { date } => {
            if db.delete(user, date)? {
                println!("Deleted entry for {}", date);
            } else {
                anyhow::bail!("No entry for {}", date);
            }
        }
    }

    Ok(())
}

/// Print statistics for the chosen period
pub fn show_stats(settings: &Settings, period: StatsPeriod, json: bool) -> Result<()> {
    let db = Database::open(settings)?;
    let analyzer = EmotionAnalyzer::default();
    let today = Local::now().date_naive();

    let stats = period_statistics(&db, &analyzer, &settings.general.user_id, period, today)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print_stats(period, &stats);
    }

    Ok(())
}

/// Record one clip, stopping when Enter is pressed
pub fn record(settings: &Settings, video: bool) -> Result<()> {
    settings.ensure_dirs()?;

    let devices = Arc::new(CpalDevices::new(&settings.recording));
    let recorder = Recorder::new(devices, settings.recording.media_dir.clone());
    let mut session = recorder.session();

    let kind = if video { MediaKind::Video } else { MediaKind::Audio };
    session.start(kind)?;

    println!("Recording {}... press Enter to stop", kind);
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;

    let path = session.stop()?;
    println!("Saved: {}", path.display());

    Ok(())
}

/// Run the voice pipeline on a file
pub async fn process_voice(
    settings: &Settings,
    file: &Path,
    note: &str,
    upload: bool,
    json: bool,
) -> Result<()> {
    let transcriber = TranscriptionClient::from_settings(settings)?;
    let mut pipeline = VoiceEntryPipeline::new(transcriber, EmotionAnalyzer::default());

    let (analysis, media_url) = if upload {
        settings.ensure_dirs()?;
        pipeline = pipeline.with_uploader(MediaUploadPipeline::from_settings(settings)?);
        let folder = today_folder(settings);
        let outcome = pipeline.process_and_upload(file, note, &folder).await?;
        (outcome.analysis, Some(outcome.media_url))
    } else {
        (pipeline.process_voice_entry(file, note).await?, None)
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        print_voice_analysis(&analysis);
    }
    if let Some(url) = media_url {
        println!("Media: {}", url);
    }

    Ok(())
}

/// Upload a captured file
pub async fn upload_file(settings: &Settings, file: &Path, folder: Option<String>) -> Result<()> {
    settings.ensure_dirs()?;
    let pipeline = MediaUploadPipeline::from_settings(settings)?;
    let folder = folder.unwrap_or_else(|| today_folder(settings));

    let url = pipeline.upload_recording(file, &folder).await?;
    println!("{}", url);

    Ok(())
}

/// Handle config subcommands
pub fn config_command(settings: &Settings, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            let toml = toml::to_string_pretty(settings)?;
            println!("{}", toml);
        }
        ConfigCommand::Path => {
            let path = Settings::config_path()?;
            println!("{}", path.display());
        }
        ConfigCommand::Init { force } => {
            let path = Settings::config_path()?;
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at {}. Use --force to overwrite.",
                    path.display()
                );
            }
            Settings::write_default(&path)?;
            println!("Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

// Helper functions

fn today_folder(settings: &Settings) -> String {
    daily_folder(&settings.upload.folder_prefix, Local::now().date_naive())
}

fn print_analysis(analysis: &EmotionAnalysis) {
    println!(
        "Dominant emotion: {} {} ({})",
        icon_of(analysis.dominant_emotion),
        analysis.dominant_label(),
        color_of(analysis.dominant_emotion)
    );
    println!(
        "Overall score: {} ({})",
        analysis.overall_score, analysis.sentiment
    );

    if !analysis.emotions.is_empty() {
        println!();
        println!("{:<14} {:<6} {:<6} {}", "Emotion", "Count", "Score", "Intensity");
        for score in &analysis.emotions {
            println!(
                "{:<14} {:<6} {:<6} {:.2}",
                score.emotion, score.count, score.score, score.intensity
            );
        }
    }

    if !analysis.keywords.is_empty() {
        let keywords: Vec<String> = analysis
            .keywords
            .iter()
            .map(|k| format!("{} x{}", k.keyword, k.count))
            .collect();
        println!();
        println!("Keywords: {}", keywords.join(", "));
    }
}

fn print_voice_analysis(analysis: &VoiceAnalysis) {
    println!("Transcript: {}", analysis.transcription);
    println!("Confidence: {:.2}", analysis.confidence);
    println!("Full text: {}", analysis.full_text);
    println!();
    print_analysis(&analysis.emotion_analysis);
    println!();
    println!(
        "Voice: {:.1}s, {:.0} words/min, energy {:.1}{}",
        analysis.voice_features.duration_secs,
        analysis.voice_features.estimated_speech_rate,
        analysis.voice_features.energy_level,
        if analysis.voice_features.detected_stress {
            ", stress detected"
        } else {
            ""
        }
    );
    println!(
        "Combined score: {:.2} (text {}, voice {:.1}, confidence {:.2})",
        analysis.combined_score.combined_score,
        analysis.combined_score.text_score,
        analysis.combined_score.voice_score,
        analysis.combined_score.confidence
    );
}

fn print_stats(period: StatsPeriod, stats: &PeriodStatistics) {
    println!("Period: {}", period);
    println!("Entries: {}", stats.total_entries);

    if stats.total_entries == 0 {
        return;
    }

    println!(
        "Average mood: {:.2} ({})",
        stats.average_score, stats.sentiment
    );
    println!(
        "Most frequent emotion: {} {}",
        icon_of(stats.most_frequent_emotion),
        stats
            .most_frequent_emotion
            .map(|e| e.as_str())
            .unwrap_or(crate::analysis::NEUTRAL)
    );

    if !stats.emotion_distribution.is_empty() {
        println!();
        for item in &stats.emotion_distribution {
            println!("  {:<14} {}", item.emotion, item.count);
        }
    }

    println!();
    for point in &stats.trend_data {
        println!(
            "  {}  {:>2}  {}",
            format_day(point.date),
            point.score,
            point.emotion.map(|e| e.as_str()).unwrap_or("")
        );
    }
}

fn entry_emotion(entry: &JournalEntry) -> &'static str {
    entry
        .emotion_analysis
        .as_ref()
        .map(|a| a.dominant_label())
        .unwrap_or(crate::analysis::NEUTRAL)
}

fn format_day(date: NaiveDate) -> String {
    date.format("%d/%m").to_string()
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars - 3).collect();
        format!("{}...", head)
    }
}
