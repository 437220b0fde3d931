use rainrun_macros::Series;

#[derive(Debug, Clone, Copy, PartialEq, Series)]
#[series(name = "MeltRecord")]
pub struct Melt {
    pub yield_: f64,
    pub swe: f64,
}

fn main() {
    let mut record = MeltRecord::with_capacity(1);
    record.push(&Melt { yield_: 0.01, swe: 0.2 });
    assert_eq!(record.len(), 1);
    assert_eq!(record.swe, vec![0.2]);
}
