use crate::models::StatsMap;
use crate::stats::compute_derived;

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.0}")).unwrap_or_else(|| "-".to_string())
}

/// Tekstrapport over cachen, sortert på aktivitets-id.
pub fn format_stats_report(stats: &StatsMap) -> String {
    let mut ids: Vec<_> = stats.keys().collect();
    ids.sort();

    let mut out = String::from("--- Klokkestatistikk ---\n");
    if ids.is_empty() {
        out.push_str("(tom)\n");
        return out;
    }
    for id in ids {
        let s = &stats[id];
        let d = compute_derived(s);
        out.push_str(&format!(
            "{id}: kcal={} aktiv={} snittpuls={} makspuls={} varighet={}s\n",
            fmt_opt(d.calories),
            fmt_opt(d.active_calories),
            fmt_opt(d.avg_heart_rate),
            fmt_opt(d.max_heart_rate),
            s.duration().num_seconds()
        ));
    }
    out
}

pub fn print_stats_report(stats: &StatsMap) {
    print!("{}", format_stats_report(stats));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityId, ActivityStats};

    #[test]
    fn report_lists_derived_values() {
        let mut map = StatsMap::new();
        map.insert(
            ActivityId::from(5_i64),
            ActivityStats {
                active_calories: Some(120.0),
                basal_calories: Some(30.0),
                start_time: 0.0,
                end_time: 60_000.0,
                ..Default::default()
            },
        );
        let r = format_stats_report(&map);
        assert!(r.contains("5: kcal=150 aktiv=120 snittpuls=- makspuls=- varighet=60s"));
    }

    #[test]
    fn empty_report() {
        assert!(format_stats_report(&StatsMap::new()).contains("(tom)"));
    }
}
