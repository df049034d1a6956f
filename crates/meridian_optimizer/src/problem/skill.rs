use fxhash::FxHashSet;

/// Opaque capability tags. A vehicle can execute a job only if it holds every
/// skill the job requires.
#[derive(Debug, Clone, Default)]
pub struct Skills(FxHashSet<u32>);

impl Skills {
    pub fn new() -> Self {
        Skills(FxHashSet::default())
    }

    pub fn from_vec(skills: Vec<u32>) -> Self {
        Skills(skills.into_iter().collect())
    }

    pub fn insert(&mut self, skill: u32) {
        self.0.insert(skill);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_subset_of(&self, other: &Skills) -> bool {
        self.0.is_subset(&other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subset() {
        let vehicle = Skills::from_vec(vec![1, 7, 9]);

        assert!(Skills::new().is_subset_of(&vehicle));
        assert!(Skills::from_vec(vec![7]).is_subset_of(&vehicle));
        assert!(Skills::from_vec(vec![1, 9]).is_subset_of(&vehicle));
        assert!(!Skills::from_vec(vec![2]).is_subset_of(&vehicle));
        assert!(!Skills::from_vec(vec![7, 2]).is_subset_of(&vehicle));
    }
}
