use rand::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperatorKind {
    Plasmid,
    SingleBranchTransposon,
    BetweenBranchesTransposon,
}

/**
    Picks the operator applied to an individual: a plasmid with probability
    `prob_plasmid`, otherwise a single-branch transposon with probability
    `prob_sb_transposon`, otherwise a between-branches transposon.
**/
#[derive(Clone, Copy, Debug)]
pub struct OperatorSelection {
    prob_plasmid: f64,
    prob_sb_transposon: f64,
}

impl OperatorSelection {
    pub fn new(prob_plasmid: f64, prob_sb_transposon: f64) -> OperatorSelection {
        OperatorSelection {
            prob_plasmid,
            prob_sb_transposon,
        }
    }

    pub fn select<R: Rng>(&self, rng: &mut R) -> OperatorKind {
        if rng.gen::<f64>() < self.prob_plasmid {
            OperatorKind::Plasmid
        } else {
            self.select_transposon(rng)
        }
    }

    /// Used on its own when no plasmid can be built.
    pub fn select_transposon<R: Rng>(&self, rng: &mut R) -> OperatorKind {
        if rng.gen::<f64>() < self.prob_sb_transposon {
            OperatorKind::SingleBranchTransposon
        } else {
            OperatorKind::BetweenBranchesTransposon
        }
    }
}
