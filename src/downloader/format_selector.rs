// FormatSelector - turns raw yt-dlp formats into a short list of choices
//
// Handles:
// - Synthetic "best" / "bestaudio" anchors
// - Quality labels (1080p 60fps (no audio), 128kbps)
// - Deduplication of container/bitrate variants
// - Dropping silent low-resolution video-only renditions
// - Ranking and truncation (8 video, 5 audio)

use std::collections::HashSet;

use super::models::{CatalogEntry, EntryKind, StreamDescriptor};

pub const BEST_VIDEO_ID: &str = "best";
pub const BEST_AUDIO_ID: &str = "bestaudio";

pub const MAX_VIDEO_ENTRIES: usize = 8;
pub const MAX_AUDIO_ENTRIES: usize = 5;

/// Video-only streams below this height are not offered
pub const MIN_SILENT_VIDEO_HEIGHT: u32 = 720;

/// Format selector with dedup and ranking
pub struct FormatSelector;

impl FormatSelector {
    /// Build the catalog entries (video entries first, then audio) from raw formats
    pub fn build_catalog_entries(formats: &[StreamDescriptor]) -> Vec<CatalogEntry> {
        let mut video = Vec::new();
        let mut audio = Vec::new();
        let mut seen_video: HashSet<(u32, String, bool)> = HashSet::new();
        let mut seen_audio: HashSet<(Option<u64>, String)> = HashSet::new();

        for f in formats {
            if f.has_video() {
                let height = f.height.unwrap_or(0);
                let ext = f.ext.clone().unwrap_or_else(|| "mp4".to_string());
                let has_audio = f.has_audio();

                if !seen_video.insert((height, ext.clone(), has_audio)) {
                    continue;
                }

                if has_audio || height >= MIN_SILENT_VIDEO_HEIGHT {
                    video.push(CatalogEntry {
                        format_id: f.format_id.clone(),
                        ext,
                        quality: Self::video_label(f),
                        filesize: f.effective_size(),
                        width: f.width,
                        height: f.height,
                        fps: f.fps,
                        vcodec: f.vcodec.clone(),
                        acodec: f.acodec.clone(),
                        abr: None,
                        has_video: true,
                        has_audio,
                        kind: EntryKind::Video,
                    });
                }
            } else if f.has_audio() {
                let ext = f.ext.clone().unwrap_or_else(|| "m4a".to_string());
                // f64 is not hashable; the bit pattern is an exact stand-in
                let key = (f.abr.map(f64::to_bits), ext.clone());

                if !seen_audio.insert(key) {
                    continue;
                }

                audio.push(CatalogEntry {
                    format_id: f.format_id.clone(),
                    ext,
                    quality: Self::audio_label(f),
                    filesize: f.effective_size(),
                    width: None,
                    height: None,
                    fps: None,
                    vcodec: None,
                    acodec: f.acodec.clone(),
                    abr: f.abr,
                    has_video: false,
                    has_audio: true,
                    kind: EntryKind::Audio,
                });
            }
        }

        // sort_by is stable: equal keys keep discovery order
        video.sort_by(|a, b| {
            b.has_audio
                .cmp(&a.has_audio)
                .then_with(|| b.height.unwrap_or(0).cmp(&a.height.unwrap_or(0)))
        });
        audio.sort_by(|a, b| {
            let (a, b) = (a.abr.unwrap_or(0.0), b.abr.unwrap_or(0.0));
            b.total_cmp(&a)
        });

        let mut entries = Vec::with_capacity(MAX_VIDEO_ENTRIES + MAX_AUDIO_ENTRIES);
        entries.push(Self::best_video());
        entries.extend(video.into_iter().take(MAX_VIDEO_ENTRIES - 1));
        entries.push(Self::best_audio());
        entries.extend(audio.into_iter().take(MAX_AUDIO_ENTRIES - 1));
        entries
    }

    /// "1080p", "1080p 60fps", "720p (no audio)", or the raw format note
    fn video_label(f: &StreamDescriptor) -> String {
        match f.height {
            Some(height) if height > 0 => {
                let mut label = format!("{}p", height);
                if let Some(fps) = f.fps.filter(|fps| *fps > 30.0) {
                    label.push_str(&format!(" {}fps", fps as u32));
                }
                if !f.has_audio() {
                    label.push_str(" (no audio)");
                }
                label
            }
            _ => f
                .format_note
                .clone()
                .unwrap_or_else(|| "Unknown Quality".to_string()),
        }
    }

    fn audio_label(f: &StreamDescriptor) -> String {
        match f.abr {
            Some(abr) if abr > 0.0 => format!("{}kbps", abr as u32),
            _ => f.format_note.clone().unwrap_or_else(|| "Audio".to_string()),
        }
    }

    fn best_video() -> CatalogEntry {
        CatalogEntry {
            format_id: BEST_VIDEO_ID.to_string(),
            ext: "mp4".to_string(),
            quality: "Best Video".to_string(),
            filesize: None,
            width: None,
            height: None,
            fps: None,
            vcodec: None,
            acodec: None,
            abr: None,
            has_video: true,
            has_audio: true,
            kind: EntryKind::Video,
        }
    }

    fn best_audio() -> CatalogEntry {
        CatalogEntry {
            format_id: BEST_AUDIO_ID.to_string(),
            ext: "m4a".to_string(),
            quality: "Best Audio".to_string(),
            filesize: None,
            width: None,
            height: None,
            fps: None,
            vcodec: None,
            acodec: None,
            abr: None,
            has_video: false,
            has_audio: true,
            kind: EntryKind::Audio,
        }
    }
}
