// carelink CLI library: plain-text rendering of run results

pub mod report;
