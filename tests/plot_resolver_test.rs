use garden_map::domain::services::resolver::{DEFAULT_CROP_COLOR, NO_RECORD_LABEL};
use garden_map::{Constraint, CropColorTable, Filter, HistoryRecord, Plot, PlotResolver};

fn sample_history() -> Vec<HistoryRecord> {
    let mut history = Vec::new();
    let crops = ["Maize", "Soy Bean", "Wheat", "Sunflower"];
    for (i, plot) in ["plot-a", "plot-b", "plot-c"].iter().enumerate() {
        for year in [2022, 2023] {
            for (j, season) in ["spring", "summer"].iter().enumerate() {
                let crop = crops[(i + j + year as usize) % crops.len()];
                history.push(HistoryRecord::new(plot, year, season, (j + 1) as u32, crop));
            }
        }
    }
    history
}

fn every_filter() -> Vec<Filter> {
    let mut filters = Vec::new();
    for year in [Constraint::All, Constraint::Only(2022), Constraint::Only(2023), Constraint::Only(2030)] {
        for season in [
            Constraint::All,
            Constraint::Only("spring".to_string()),
            Constraint::Only("winter".to_string()),
        ] {
            for rotation in [Constraint::All, Constraint::Only(1), Constraint::Only(2)] {
                filters.push(Filter::new(year.clone(), season.clone(), rotation.clone()));
            }
        }
    }
    filters
}

fn plots() -> Vec<Plot> {
    vec![
        Plot::new("Plot-A", None),
        Plot::new("  plot-b", None),
        Plot::new("PLOT-C ", None),
        Plot::new("plot-d", None),
        Plot::new("", None),
    ]
}

#[test]
fn test_result_agrees_with_first_candidate() {
    let resolver = PlotResolver::default();
    let history = sample_history();

    for filter in every_filter() {
        for plot in plots() {
            let candidates: Vec<&HistoryRecord> = history
                .iter()
                .filter(|r| r.belongs_to(&plot) && filter.matches(r))
                .collect();
            let result = resolver.resolve(&plot, &history, &filter);

            match candidates.first() {
                None => {
                    assert_eq!(result.color, DEFAULT_CROP_COLOR, "{} / {}", plot.display_name(), filter);
                    assert_eq!(result.label, NO_RECORD_LABEL);
                }
                Some(first) => {
                    assert_eq!(result.record.as_ref(), Some(*first));
                    assert_eq!(result.color, resolver.colors().get(&first.crop_type));
                }
            }
        }
    }
}

#[test]
fn test_all_constraint_is_same_as_omitted() {
    let resolver = PlotResolver::default();
    let history = sample_history();
    let explicit = Filter::new(Constraint::All, Constraint::All, Constraint::All);

    for plot in plots() {
        assert_eq!(
            resolver.resolve(&plot, &history, &explicit),
            resolver.resolve(&plot, &history, &Filter::all())
        );
    }

    let partial = Filter::new(Constraint::Only(2023), Constraint::All, Constraint::All);
    for plot in plots() {
        assert_eq!(
            resolver.resolve(&plot, &history, &partial),
            resolver.resolve(&plot, &history, &Filter::all().with_year(2023))
        );
    }
}

#[test]
fn test_constraints_are_conjunctive() {
    let history = sample_history();

    for filter in every_filter() {
        for record in &history {
            let expected = filter.year().admits(&record.year)
                && filter.season().admits(&record.season)
                && filter.rotation_order().admits(&record.rotation_order);
            assert_eq!(filter.matches(record), expected, "{} vs {:?}", filter, record);
        }
    }
}

#[test]
fn test_resolve_is_deterministic() {
    let resolver = PlotResolver::default();
    let history = sample_history();
    let plots = plots();

    for filter in every_filter() {
        let first = resolver.resolve_all(&plots, &history, &filter);
        let second = resolver.resolve_all(&plots, &history, &filter);
        let first: Vec<_> = first.into_iter().map(|(_, r)| r).collect();
        let second: Vec<_> = second.into_iter().map(|(_, r)| r).collect();
        assert_eq!(first, second);
    }
}

#[test]
fn test_custom_table_and_default_color() {
    let table = CropColorTable::new("white").with_crop("Maize", "gold");
    let resolver = PlotResolver::new(table);
    let plot = Plot::new("plot-a", None);

    let maize = [HistoryRecord::new("plot-a", 2023, "spring", 1, "Maize")];
    assert_eq!(resolver.resolve(&plot, &maize, &Filter::all()).color, "gold");

    let wheat = [HistoryRecord::new("plot-a", 2023, "spring", 1, "Wheat")];
    assert_eq!(resolver.resolve(&plot, &wheat, &Filter::all()).color, "white");
    assert_eq!(resolver.resolve(&plot, &[], &Filter::all()).color, "white");
}
