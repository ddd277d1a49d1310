use std::collections::HashSet;

use rand::Rng;

const SUFFIX_LEN: usize = 9;
const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Issues ids that are unique within one assembled set.
#[derive(Debug, Default)]
pub struct IdGenerator {
    issued: HashSet<String>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// `{prefix}_{index}_{random suffix}`, redrawn on the rare collision.
    pub fn fresh<R: Rng + ?Sized>(&mut self, prefix: &str, index: usize, rng: &mut R) -> String {
        loop {
            let id = format!("{prefix}_{index}_{}", random_suffix(rng));
            if self.issued.insert(id.clone()) {
                return id;
            }
        }
    }

    /// Register a positional id; repeats get a numeric tail.
    pub fn positional(&mut self, base: String) -> String {
        if self.issued.insert(base.clone()) {
            return base;
        }
        let mut n = 2;
        loop {
            let id = format!("{base}~{n}");
            if self.issued.insert(id.clone()) {
                return id;
            }
            n += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.issued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issued.is_empty()
    }
}

fn random_suffix<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..SUFFIX_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}
