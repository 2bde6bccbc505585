/// Side-channel metadata a caster reports alongside its schema. Recomputed
/// on every request by walking the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attributes {
    pub required: bool,
    pub picked: Vec<String>,
    pub remapped: Remapping,
    /// Schema `oneOf` lists may be paired branch-by-branch when merged.
    pub extendable: bool,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            required: true,
            picked: Vec::new(),
            remapped: Remapping::new(),
            extendable: false,
        }
    }
}

impl Attributes {
    pub fn optional() -> Self {
        Self { required: false, ..Self::default() }
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

// ------------------------------- Remapping -------------------------------- //

/// Ordered `input key -> output key` pairs produced by hash construction.
/// The input side is `None` when an output key is computed without reading
/// any input key; such entries never collide with each other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Remapping {
    entries: Vec<(Option<String>, String)>,
}

impl Remapping {
    pub fn new() -> Self { Self::default() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn len(&self) -> usize { self.entries.len() }

    /// A later pair replaces an earlier one reading the same input key.
    pub fn insert(&mut self, from: Option<String>, to: String) {
        let slot = self.entries.iter_mut().find(|(f, t)| match (&from, f) {
            (Some(a), Some(b)) => a == b,
            (None, None) => *t == to,
            _ => false,
        });
        match slot {
            Some(entry) => entry.1 = to,
            None => self.entries.push((from, to)),
        }
    }

    pub fn extend(&mut self, other: &Remapping) {
        for (from, to) in &other.entries {
            self.insert(from.clone(), to.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Option<&str>, &str)> {
        self.entries.iter().map(|(f, t)| (f.as_deref(), t.as_str()))
    }

    /// Output key for input key `from`.
    pub fn get(&self, from: &str) -> Option<&str> {
        self.iter().find(|(f, _)| *f == Some(from)).map(|(_, t)| t)
    }

    /// How many pairs write output key `to`.
    pub fn sources_of(&self, to: &str) -> usize {
        self.entries.iter().filter(|(_, t)| t == to).count()
    }
}

impl FromIterator<(Option<String>, String)> for Remapping {
    fn from_iter<I: IntoIterator<Item = (Option<String>, String)>>(iter: I) -> Self {
        let mut out = Remapping::new();
        for (from, to) in iter {
            out.insert(from, to);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_pair_wins_for_same_input() {
        let mut a: Remapping = [(Some("x".to_string()), "a".to_string())].into_iter().collect();
        let b: Remapping = [
            (Some("x".to_string()), "b".to_string()),
            (None, "c".to_string()),
        ]
        .into_iter()
        .collect();
        a.extend(&b);
        assert_eq!(a.get("x"), Some("b"));
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn unsourced_pairs_accumulate() {
        let m: Remapping = [(None, "a".to_string()), (None, "b".to_string()), (None, "a".to_string())]
            .into_iter()
            .collect();
        assert_eq!(m.len(), 2);
        assert_eq!(m.sources_of("a"), 1);
    }
}
