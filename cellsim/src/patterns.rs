// patterns.rs - Well-known starting patterns, as offsets from their top-left corner

pub struct Pattern {
    pub name: &'static str,
    pub cells: &'static [(usize, usize)],
}

impl Pattern {
    /// Bounding box `(rows, cols)`.
    pub fn extent(&self) -> (usize, usize) {
        self.cells
            .iter()
            .fold((0, 0), |(h, w), &(r, c)| (h.max(r + 1), w.max(c + 1)))
    }

    pub fn find(name: &str) -> Option<&'static Pattern> {
        PATTERNS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

pub const GLIDER: Pattern = Pattern {
    name: "Glider",
    cells: &[(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)],
};

#[rustfmt::skip]
pub const PATTERNS: &[Pattern] = &[
    GLIDER,
    Pattern {
        name: "Blinker",
        cells: &[(0, 0), (0, 1), (0, 2)],
    },
    Pattern {
        name: "Toad",
        cells: &[(0, 1), (0, 2), (0, 3), (1, 0), (1, 1), (1, 2)],
    },
    Pattern {
        name: "Beacon",
        cells: &[(0, 0), (0, 1), (1, 0), (1, 1), (2, 2), (2, 3), (3, 2), (3, 3)],
    },
    Pattern {
        name: "Pulsar",
        cells: &[
            // Top half
            (0, 2), (0, 3), (0, 4), (0, 8), (0, 9), (0, 10),
            (2, 0), (2, 5), (2, 7), (2, 12),
            (3, 0), (3, 5), (3, 7), (3, 12),
            (4, 0), (4, 5), (4, 7), (4, 12),
            (5, 2), (5, 3), (5, 4), (5, 8), (5, 9), (5, 10),
            // Bottom half (mirrored)
            (7, 2), (7, 3), (7, 4), (7, 8), (7, 9), (7, 10),
            (8, 0), (8, 5), (8, 7), (8, 12),
            (9, 0), (9, 5), (9, 7), (9, 12),
            (10, 0), (10, 5), (10, 7), (10, 12),
            (12, 2), (12, 3), (12, 4), (12, 8), (12, 9), (12, 10),
        ],
    },
    Pattern {
        name: "R-pentomino",
        cells: &[(0, 1), (0, 2), (1, 0), (1, 1), (2, 1)],
    },
    Pattern {
        name: "Gosper Glider Gun",
        cells: &[
            (4, 0), (4, 1), (5, 0), (5, 1),
            (4, 10), (5, 10), (6, 10), (3, 11), (7, 11), (2, 12), (8, 12),
            (2, 13), (8, 13), (5, 14), (3, 15), (7, 15), (4, 16), (5, 16),
            (6, 16), (5, 17), (2, 20), (3, 20), (4, 20), (2, 21), (3, 21),
            (4, 21), (1, 22), (5, 22), (0, 24), (1, 24), (5, 24), (6, 24),
            (2, 34), (3, 34), (2, 35), (3, 35),
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extents() {
        assert_eq!(GLIDER.extent(), (3, 3));
        assert_eq!(Pattern::find("pulsar").unwrap().extent(), (13, 13));
        assert_eq!(Pattern::find("Gosper Glider Gun").unwrap().extent(), (9, 36));
    }

    #[test]
    fn test_find_unknown() {
        assert!(Pattern::find("spaceship").is_none());
    }

    #[test]
    fn test_no_duplicate_cells() {
        for pattern in PATTERNS {
            let mut cells = pattern.cells.to_vec();
            cells.sort_unstable();
            cells.dedup();
            assert_eq!(cells.len(), pattern.cells.len(), "{}", pattern.name);
        }
    }
}
