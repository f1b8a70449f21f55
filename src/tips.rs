//! Clippy-style tips: one random message at a time, no repeats within a day,
//! with a "don't show today" switch that survives restarts.

use std::collections::BTreeSet;
use std::fs::OpenOptions;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const TIPS: [&str; 40] = [
    "It looks like you're reading an article. Would you like help understanding it?",
    "Need help with a tricky paragraph? Just select it!",
    "Would you like me to simplify something?",
    "Can I assist you with that complex term?",
    "It looks like you're learning something new!",
    "Stuck on a concept? I can explain it simply!",
    "Would you like help with your reading?",
    "Looks like you're exploring quantum computing!",
    "Can I give you a hand with definitions?",
    "It looks like you're trying to understand something complex.",
    "Need a summary? Just select the text!",
    "Would you like me to break that down for you?",
    "Confused by jargon? I can help!",
    "It seems you're reading about science. Want examples?",
    "Can I explain that in simpler terms?",
    "Would you like to see some real-world examples?",
    "Looks like you're doing research!",
    "Need help understanding technical terms?",
    "Would you like a quick summary of this section?",
    "It looks like you're trying to learn. I'm here to help!",
    "Highlight any text and I'll explain it!",
    "Want me to make this easier to understand?",
    "Need definitions? Just ask!",
    "Would you like me to simplify this article?",
    "It looks like you're reading something interesting!",
    "Can I help you understand this better?",
    "Stuck? Select text and I'll help!",
    "Would you like examples to make this clearer?",
    "It seems you're exploring new topics!",
    "Need a hand with comprehension?",
    "Would you like me to explain like you're 5?",
    "Looks like you're expanding your knowledge!",
    "Can I break down complex ideas for you?",
    "It looks like you're trying to grasp a difficult concept.",
    "Want me to give you the key points?",
    "Would you like help with vocabulary?",
    "Need analogies to understand better?",
    "It looks like you're reading technical content!",
    "Can I make this more digestible?",
    "Would you like a plain-language explanation?",
];

pub const FIRST_TIP_DELAY: Duration = Duration::from_secs(10);
pub const MIN_INTERVAL: Duration = Duration::from_secs(30);
pub const MAX_INTERVAL: Duration = Duration::from_secs(90);
pub const TIP_DURATION: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TipPreferences {
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default)]
    pub last_date: Option<NaiveDate>,
    #[serde(default)]
    pub shown_today: BTreeSet<usize>,
}

fn enabled_by_default() -> bool {
    true
}

impl Default for TipPreferences {
    fn default() -> Self {
        Self {
            enabled: true,
            last_date: None,
            shown_today: BTreeSet::new(),
        }
    }
}

/// `<config dir>/clippy-reader/tips.json`.
pub fn preferences_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("clippy-reader").join("tips.json"))
}

pub fn load_preferences(path: &Path) -> anyhow::Result<TipPreferences> {
    if !path.exists() {
        return Ok(TipPreferences::default());
    }
    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}

pub fn save_preferences(path: &Path, prefs: &TipPreferences) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().write(true).create(true).truncate(true).open(path)?;
    serde_json::to_writer_pretty(file, prefs)?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActiveTip {
    index: usize,
    shown_at: Instant,
}

pub struct TipScheduler {
    prefs: TipPreferences,
    store: Option<PathBuf>,
    current: Option<ActiveTip>,
}

impl TipScheduler {
    /// Forgets tips shown on an earlier day.
    pub fn new(mut prefs: TipPreferences, today: NaiveDate) -> Self {
        if prefs.last_date != Some(today) {
            prefs.shown_today.clear();
            prefs.last_date = Some(today);
        }
        Self {
            prefs,
            store: None,
            current: None,
        }
    }

    /// Loads preferences from `path` and writes every change back to it.
    pub fn load(path: PathBuf, today: NaiveDate) -> anyhow::Result<Self> {
        let prefs = load_preferences(&path)?;
        let mut scheduler = Self::new(prefs, today);
        scheduler.store = Some(path);
        scheduler.persist();
        Ok(scheduler)
    }

    pub fn preferences(&self) -> &TipPreferences {
        &self.prefs
    }

    pub fn current_tip(&self) -> Option<&'static str> {
        self.current.map(|tip| TIPS[tip.index])
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.prefs.enabled = enabled;
        self.persist();
    }

    /// Picks a tip not yet shown today. Nothing is shown while another tip
    /// is open, when tips are disabled, or once every tip has been used.
    pub fn show_random_tip(&mut self, now: Instant) -> Option<&'static str> {
        if !self.prefs.enabled || self.current.is_some() {
            return None;
        }

        let available: Vec<usize> = (0..TIPS.len())
            .filter(|i| !self.prefs.shown_today.contains(i))
            .collect();
        if available.is_empty() {
            debug!("every tip already shown today");
            return None;
        }

        let pick = ((rand::random::<f32>() * available.len() as f32) as usize).min(available.len() - 1);
        let index = available[pick];

        self.prefs.shown_today.insert(index);
        self.persist();
        self.current = Some(ActiveTip { index, shown_at: now });
        Some(TIPS[index])
    }

    pub fn close_tip(&mut self) {
        self.current = None;
    }

    /// Marks every tip as shown for the rest of the day.
    pub fn disable_today(&mut self) {
        self.prefs.shown_today.extend(0..TIPS.len());
        self.persist();
        self.close_tip();
    }

    /// Auto-closes a tip that has been open for `TIP_DURATION`. Returns true
    /// if a tip was closed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.current {
            Some(tip) if now.duration_since(tip.shown_at) >= TIP_DURATION => {
                self.close_tip();
                true
            }
            _ => false,
        }
    }

    /// Starts a fresh day when the date has changed.
    pub fn roll_over(&mut self, today: NaiveDate) {
        if self.prefs.last_date != Some(today) {
            self.prefs.shown_today.clear();
            self.prefs.last_date = Some(today);
            self.persist();
        }
    }

    /// Random delay before the next tip, between 30 and 90 seconds.
    pub fn next_delay() -> Duration {
        MIN_INTERVAL + (MAX_INTERVAL - MIN_INTERVAL).mul_f32(rand::random::<f32>())
    }

    fn persist(&self) {
        if let Some(path) = &self.store {
            if let Err(err) = save_preferences(path, &self.prefs) {
                warn!(path = %path.display(), error = %err, "could not save tip preferences");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    #[test]
    fn tips_never_repeat_until_all_shown() {
        let mut scheduler = TipScheduler::new(TipPreferences::default(), day(1));
        let now = Instant::now();
        let mut seen = HashSet::new();

        for _ in 0..TIPS.len() {
            let tip = scheduler.show_random_tip(now).unwrap();
            assert!(seen.insert(tip), "repeated tip: {tip}");
            scheduler.close_tip();
        }
        assert_eq!(scheduler.show_random_tip(now), None);
    }

    #[test]
    fn only_one_tip_at_a_time() {
        let mut scheduler = TipScheduler::new(TipPreferences::default(), day(1));
        let now = Instant::now();
        assert!(scheduler.show_random_tip(now).is_some());
        assert!(scheduler.show_random_tip(now).is_none());
    }

    #[test]
    fn tip_auto_closes_after_duration() {
        let mut scheduler = TipScheduler::new(TipPreferences::default(), day(1));
        let now = Instant::now();
        scheduler.show_random_tip(now);
        assert!(!scheduler.tick(now + Duration::from_secs(5)));
        assert!(scheduler.tick(now + TIP_DURATION));
        assert!(scheduler.current_tip().is_none());
    }

    #[test]
    fn disable_today_lasts_until_the_date_changes() {
        let mut scheduler = TipScheduler::new(TipPreferences::default(), day(1));
        let now = Instant::now();
        scheduler.disable_today();
        assert!(scheduler.show_random_tip(now).is_none());

        scheduler.roll_over(day(2));
        assert!(scheduler.show_random_tip(now).is_some());
    }

    #[test]
    fn stale_history_is_dropped_on_load() {
        let prefs = TipPreferences {
            enabled: true,
            last_date: Some(day(1)),
            shown_today: (0..TIPS.len()).collect(),
        };
        assert_eq!(TipScheduler::new(prefs.clone(), day(1)).preferences().shown_today.len(), TIPS.len());
        assert!(TipScheduler::new(prefs, day(2)).preferences().shown_today.is_empty());
    }

    #[test]
    fn disabled_scheduler_shows_nothing() {
        let mut scheduler = TipScheduler::new(TipPreferences::default(), day(1));
        scheduler.set_enabled(false);
        assert!(scheduler.show_random_tip(Instant::now()).is_none());
    }

    #[test]
    fn next_delay_stays_in_range() {
        for _ in 0..100 {
            let delay = TipScheduler::next_delay();
            assert!(delay >= MIN_INTERVAL && delay <= MAX_INTERVAL);
        }
    }

    #[test]
    fn preferences_round_trip_through_disk() {
        let path = std::env::temp_dir().join(format!("clippy-tips-{}.json", std::process::id()));
        let _ = std::fs::remove_file(&path);

        {
            let mut scheduler = TipScheduler::load(path.clone(), day(3)).unwrap();
            scheduler.show_random_tip(Instant::now());
        }
        let prefs = load_preferences(&path).unwrap();
        assert_eq!(prefs.last_date, Some(day(3)));
        assert_eq!(prefs.shown_today.len(), 1);

        std::fs::remove_file(&path).unwrap();
    }
}
