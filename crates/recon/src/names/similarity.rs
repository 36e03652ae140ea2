/// Share of `a`'s elements found in `b`, over the larger of the two sizes.
///
/// Two empty inputs have no defined similarity and yield `NaN`, which fails
/// every threshold comparison.
pub fn set_similarity<T: PartialEq>(a: &[T], b: &[T]) -> f64 {
    let denom = a.len().max(b.len());
    if denom == 0 {
        return f64::NAN;
    }
    let shared = a.iter().filter(|x| b.contains(x)).count();
    shared as f64 / denom as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_overlap() {
        assert_eq!(set_similarity(&[0, 1, 2], &[0, 1, 2, 3]), 0.75);
        assert_eq!(set_similarity(&["a"], &["b"]), 0.0);
        assert_eq!(set_similarity(&["a", "b"], &["b", "a"]), 1.0);
    }

    #[test]
    fn empty_inputs() {
        let none: [u8; 0] = [];
        assert!(set_similarity(&none, &none).is_nan());
        assert!(!(set_similarity(&none, &none) >= 0.5));
        assert_eq!(set_similarity(&none, &[1]), 0.0);
    }
}
