use rainrun_macros::Series;

#[derive(Debug, Clone, Copy, PartialEq, Series)]
pub struct Step {
    pub actual_et: f64,
    pub runoff: f64,
    pub recharge: f64,
}

fn main() {
    let mut series = StepSeries::with_capacity(4);
    assert!(series.is_empty());
    series.push(&Step { actual_et: 1.0, runoff: 2.0, recharge: 0.5 });
    series.push(&Step { actual_et: 0.5, runoff: 1.0, recharge: 0.0 });

    assert_eq!(series.len(), 2);
    assert_eq!(series.get(1), Some(Step { actual_et: 0.5, runoff: 1.0, recharge: 0.0 }));
    assert_eq!(series.get(2), None);

    let totals = series.totals();
    assert_eq!(totals.actual_et, 1.5);
    assert_eq!(totals.runoff, 3.0);
    assert_eq!(totals.to_array(), [1.5, 3.0, 0.5]);
    assert_eq!(Step::field_names(), &["actual_et", "runoff", "recharge"]);
}
