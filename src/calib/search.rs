//! Longest-run search shared by the sweep calibrations
//!
//! Both the TX quadrature phase search and the digital interface tuning
//! sweep a parameter, score each point, and settle on the middle of the
//! widest window of good points. A score of zero marks a good point.

/// Contiguous run of good points in a sweep
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Run {
    /// Index of the first point of the run
    pub start: usize,
    /// Number of points in the run
    pub len: usize,
}

impl Run {
    /// Middle point of the run
    #[must_use]
    pub const fn center(&self) -> usize {
        self.start + self.len / 2
    }

    /// True when no good point was found
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Find the longest run of zero scores. The earliest run wins a tie.
#[must_use]
pub fn find_opt(field: &[u8]) -> Run {
    let mut best = Run::default();
    let mut cur = Run::default();

    for (i, &score) in field.iter().enumerate() {
        if score == 0 {
            if cur.len == 0 {
                cur.start = i;
            }
            cur.len += 1;
            if cur.len > best.len {
                best = cur;
            }
        } else {
            cur.len = 0;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_field() {
        assert!(find_opt(&[]).is_empty());
        assert!(find_opt(&[1, 1, 3]).is_empty());
    }

    #[test]
    fn picks_longest_run() {
        let field = [1, 0, 0, 1, 0, 0, 0, 0, 1, 0];
        assert_eq!(find_opt(&field), Run { start: 4, len: 4 });
        assert_eq!(find_opt(&field).center(), 6);
    }

    #[test]
    fn first_run_wins_tie() {
        let field = [0, 0, 1, 0, 0];
        assert_eq!(find_opt(&field), Run { start: 0, len: 2 });
    }

    #[test]
    fn run_reaching_the_end() {
        let field = [1, 1, 0, 0, 0];
        assert_eq!(find_opt(&field), Run { start: 2, len: 3 });
    }

    #[test]
    fn wrapped_phase_field() {
        // phases 10..=17 fail; the good window wraps past 31 back to 0
        let mut field = [0u8; 64];
        for i in 10..18 {
            field[i] = 1;
            field[i + 32] = 1;
        }
        let run = find_opt(&field);
        assert_eq!(run, Run { start: 18, len: 24 });
        assert_eq!(run.center() % 32, 30);
    }
}
