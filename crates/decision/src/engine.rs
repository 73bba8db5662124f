use crate::config::DecisionConfig;
use crate::detection::Detection;
use crate::verdict::{Category, Verdict};

/// Best confidence per class name, in first-seen order.
///
/// Class names are lowercased; a missing name aggregates under the empty
/// string. Missing or non-finite confidences count as 0.0.
fn aggregate_best_per_class(detections: &[Detection]) -> Vec<(String, f64)> {
    let mut best: Vec<(String, f64)> = Vec::new();
    for det in detections {
        let name = det.class_name.as_deref().unwrap_or("").to_lowercase();
        let conf = match det.confidence {
            Some(c) if c.is_finite() => c,
            _ => 0.0,
        };
        match best.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => {
                if conf > entry.1 {
                    entry.1 = conf;
                }
            }
            None => best.push((name, conf)),
        }
    }
    best
}

/// Turn a set of raw detections into a final category verdict.
///
/// Ranks aggregated classes by confidence (stable, so equal confidences keep
/// first-seen order) and walks the rules in priority order:
///
/// 1. top class is `paper`/`plastic` and beats its per-class threshold:
///    accepted if it also leads the runner-up by `confidence_margin`,
///    otherwise the result stays `general` with the uncertain flag set;
/// 2. top class is `paper`/`plastic` and only clears `global_min`: assigned
///    anyway but flagged uncertain;
/// 3. everything else falls through to `general`.
///
/// The reported confidence is always the top aggregated confidence, whatever
/// category wins.
pub fn decide(detections: &[Detection], config: &DecisionConfig) -> Verdict {
    let mut ranked = aggregate_best_per_class(detections);
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let (top_name, top_conf) = ranked
        .first()
        .map(|(name, conf)| (name.as_str(), *conf))
        .unwrap_or(("general", 0.0));
    let second_conf = ranked.get(1).map(|(_, conf)| *conf).unwrap_or(0.0);

    let margin = config.confidence_margin;
    let global_min = config.global_min;

    let mut category = Category::General;
    let mut uncertain = false;
    let mut notes = Vec::new();

    if top_name == "paper" && top_conf >= config.paper_threshold {
        if top_conf - second_conf >= margin {
            category = Category::Paper;
            notes.push(format!(
                "paper>=threshold ({top_conf:.3} >= {}) and margin ok",
                config.paper_threshold
            ));
        } else {
            uncertain = true;
            notes.push(format!(
                "paper margin not met ({top_conf:.3} - {second_conf:.3} < {margin})"
            ));
        }
    } else if top_name == "plastic" && top_conf >= config.plastic_threshold {
        if top_conf - second_conf >= margin {
            category = Category::Plastic;
            notes.push(format!(
                "plastic>=threshold ({top_conf:.3} >= {}) and margin ok",
                config.plastic_threshold
            ));
        } else {
            uncertain = true;
            notes.push(format!(
                "plastic margin not met ({top_conf:.3} - {second_conf:.3} < {margin})"
            ));
        }
    } else if top_conf >= global_min && (top_name == "paper" || top_name == "plastic") {
        category = if top_name == "paper" {
            Category::Paper
        } else {
            Category::Plastic
        };
        uncertain = true;
        notes.push(format!(
            "assigned by GLOBAL_MIN ({top_conf:.3} >= {global_min}) but flagged uncertain"
        ));
    } else {
        notes.push("no class met thresholds; default to general".to_string());
    }

    Verdict {
        category,
        confidence: top_conf,
        uncertain,
        notes,
    }
}
