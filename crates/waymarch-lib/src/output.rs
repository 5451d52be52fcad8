//! Report types and narrative rendering for the player commands.
//!
//! Reports carry their structured pieces for hosts that want them, plus a
//! `render` that produces the one supported output: plain human-readable
//! text. A fumbled answer renders exactly like a real one; the pretense is
//! the feature, and only the structured flag gives it away.

use crate::route::NextStep;
use crate::search::TrackPlan;
use crate::world::{Direction, KeyId, World, ZoneId};
use crate::zone::ZoneSurvey;

/// Modifier of the survey command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurveyMode {
    /// Zone path only.
    Plain,
    /// Adds the key census and the nearest blocking lock.
    Analyze,
    /// Adds a quick-versus-deep router comparison.
    Compare,
}

/// Outcome of the tracking command.
#[derive(Debug, Clone)]
pub struct TrackReport {
    pub step: NextStep,
    /// Movement-cost estimate for the route, zero on failure.
    pub cost: u32,
    /// Movement points the walk will take. Mirrors `cost`.
    pub moves_needed: u32,
    /// Low proficiency produced a guess instead of a route.
    pub fumbled: bool,
    /// The agent's current movement points fall short of `moves_needed`.
    pub short_on_moves: bool,
    details: Vec<String>,
}

impl TrackReport {
    pub(crate) fn plain(step: NextStep, cost: u32, short_on_moves: bool) -> Self {
        Self {
            step,
            cost,
            moves_needed: cost,
            fumbled: false,
            short_on_moves,
            details: Vec::new(),
        }
    }

    pub(crate) fn fumble(dir: Option<Direction>) -> Self {
        Self {
            step: dir.map_or(NextStep::NoPath, NextStep::Toward),
            cost: 0,
            moves_needed: 0,
            fumbled: true,
            short_on_moves: false,
            details: Vec::new(),
        }
    }

    pub(crate) fn advanced(
        plan: TrackPlan,
        recon: &ZoneSurvey,
        world: &World,
        short_on_moves: bool,
    ) -> Self {
        let mut details = vec![zone_path_line(recon, world)];
        if let Some(scope) = &recon.scope {
            details.push(format!(
                "{} key items lie along the corridor; {} locks want keys you lack.",
                scope.census,
                scope.required.len()
            ));
        }
        if !plan.notes.is_empty() {
            details.push(sentence(&plan.notes));
        }
        Self {
            step: plan.step,
            cost: plan.cost,
            moves_needed: plan.moves_needed,
            fumbled: false,
            short_on_moves,
            details,
        }
    }

    /// Human-readable narrative, the only supported rendering.
    pub fn render(&self) -> String {
        let mut lines = vec![match self.step {
            NextStep::Toward(dir) => format!("You sense a trail {dir} from here."),
            NextStep::AlreadyThere => "You are standing where the trail ends.".to_string(),
            NextStep::NoPath => "You find no trail to follow.".to_string(),
            NextStep::InvalidQuery => "You cannot get there from here.".to_string(),
        }];
        if self.short_on_moves {
            lines.push("You are too spent to follow it all the way.".to_string());
        }
        lines.extend(self.details.iter().cloned());
        lines.join("\n")
    }
}

/// Outcome of the survey command.
#[derive(Debug, Clone)]
pub struct SurveyReport {
    pub mode: SurveyMode,
    /// Proficiency below the expert gate; nothing else is filled in.
    pub refused: bool,
    pub zone_path: Option<Vec<ZoneId>>,
    zone_names: Vec<String>,
    pub census: Option<usize>,
    pub required_keys: Vec<KeyId>,
    pub blocking_key: Option<KeyId>,
    /// Cheap-router verdict and cost, `Compare` mode only.
    pub quick: Option<(NextStep, u32)>,
    /// Deep-router verdict and cost, `Compare` mode only.
    pub deep: Option<(NextStep, u32)>,
}

impl SurveyReport {
    pub(crate) fn refusal(mode: SurveyMode) -> Self {
        Self {
            mode,
            refused: true,
            zone_path: None,
            zone_names: Vec::new(),
            census: None,
            required_keys: Vec::new(),
            blocking_key: None,
            quick: None,
            deep: None,
        }
    }

    fn base(mode: SurveyMode, recon: &ZoneSurvey, world: &World) -> Self {
        let zone_names = recon
            .zone_path
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|&zone| zone_name(world, zone))
            .collect();
        let (census, required_keys) = match &recon.scope {
            Some(scope) => (Some(scope.census), scope.required.clone()),
            None => (None, Vec::new()),
        };
        Self {
            mode,
            refused: false,
            zone_path: recon.zone_path.clone(),
            zone_names,
            census,
            required_keys,
            blocking_key: None,
            quick: None,
            deep: None,
        }
    }

    pub(crate) fn plain(recon: &ZoneSurvey, world: &World) -> Self {
        Self::base(SurveyMode::Plain, recon, world)
    }

    pub(crate) fn analysis(recon: &ZoneSurvey, blocking: Option<KeyId>, world: &World) -> Self {
        let mut report = Self::base(SurveyMode::Analyze, recon, world);
        report.blocking_key = blocking;
        report
    }

    pub(crate) fn comparison(
        recon: &ZoneSurvey,
        quick: (NextStep, u32),
        deep: (NextStep, u32),
        world: &World,
    ) -> Self {
        let mut report = Self::base(SurveyMode::Compare, recon, world);
        report.quick = Some(quick);
        report.deep = Some(deep);
        report
    }

    /// Human-readable narrative, the only supported rendering.
    pub fn render(&self) -> String {
        if self.refused {
            return "The weave of trails is beyond your reading.".to_string();
        }

        let mut lines = vec![match (&self.zone_path, self.zone_names.as_slice()) {
            (None, _) => "No way through the zones suggests itself.".to_string(),
            (Some(_), [only]) => format!("The whole trail lies within {only}."),
            (Some(_), [a, b]) => format!("{a} and {b} border each other; the trail is short."),
            (Some(_), names) => format!(
                "The scent crosses {} zones: {}.",
                names.len(),
                names.join(", ")
            ),
        }];

        if matches!(self.mode, SurveyMode::Analyze) {
            if let Some(census) = self.census {
                lines.push(format!(
                    "{} key items lie along the corridor; {} locks want keys you lack.",
                    census,
                    self.required_keys.len()
                ));
            }
            lines.push(match self.blocking_key {
                Some(key) => format!("The nearest obstacle is a lock wanting key {key}."),
                None => "No locked door bars the immediate way.".to_string(),
            });
        }

        if matches!(self.mode, SurveyMode::Compare) {
            if let (Some(quick), Some(deep)) = (self.quick, self.deep) {
                lines.push(reckoning_line("Quick reckoning", quick));
                lines.push(reckoning_line("Deep reckoning", deep));
                if quick.0 == deep.0 {
                    lines.push("Both reckonings agree.".to_string());
                }
            }
        }

        lines.join("\n")
    }
}

fn zone_name(world: &World, zone: ZoneId) -> String {
    world
        .zone(zone)
        .map_or_else(|| format!("zone {zone}"), |z| z.name.clone())
}

fn zone_path_line(recon: &ZoneSurvey, world: &World) -> String {
    match recon.zone_path.as_deref() {
        None => "No way through the zones suggests itself.".to_string(),
        Some([only]) => format!("The whole trail lies within {}.", zone_name(world, *only)),
        Some(path) => format!(
            "The scent crosses {} zones: {}.",
            path.len(),
            path.iter()
                .map(|&zone| zone_name(world, zone))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

fn reckoning_line(label: &str, (step, cost): (NextStep, u32)) -> String {
    match step {
        NextStep::Toward(dir) => format!("{label}: the trail leads {dir}, about {cost} movement."),
        NextStep::AlreadyThere => format!("{label}: you are already there."),
        NextStep::NoPath => format!("{label}: no trail at all."),
        NextStep::InvalidQuery => format!("{label}: the question makes no sense."),
    }
}

/// Capitalize a diagnostic phrase into a standalone sentence.
fn sentence(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 1);
    let mut chars = raw.chars();
    if let Some(first) = chars.next() {
        out.extend(first.to_uppercase());
        out.push_str(chars.as_str());
    }
    if !out.ends_with('.') {
        out.push('.');
    }
    out
}
