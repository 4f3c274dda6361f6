//! Distance helpers shared by both backends.

use crate::error::{Error, Result};

/// Squared Euclidean (L2) distance.
///
/// Both slices must have the same length.
#[inline]
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Reject empty vectors and vectors containing NaN or infinite values.
pub fn validate_vector(vector: &[f32]) -> Result<()> {
    if vector.is_empty() {
        return Err(Error::InvalidVector("Vector is empty".to_string()));
    }
    if vector.iter().any(|v| !v.is_finite()) {
        return Err(Error::InvalidVector(
            "Vector contains NaN or Inf".to_string(),
        ));
    }
    Ok(())
}

/// Order `(position, distance)` pairs nearest-first, ties by lower position.
pub(crate) fn sort_neighbors(neighbors: &mut [(usize, f32)]) {
    neighbors.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_squared_l2() {
        assert_eq!(squared_l2(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(squared_l2(&[0.0, 0.0], &[3.0, 4.0]), 25.0);
    }

    #[test]
    fn test_validate_vector() {
        assert!(validate_vector(&[0.5, -1.0]).is_ok());
        assert!(matches!(validate_vector(&[]), Err(Error::InvalidVector(_))));
        assert!(matches!(
            validate_vector(&[1.0, f32::NAN]),
            Err(Error::InvalidVector(_))
        ));
        assert!(matches!(
            validate_vector(&[f32::INFINITY]),
            Err(Error::InvalidVector(_))
        ));
    }

    #[test]
    fn test_sort_neighbors_breaks_ties_by_position() {
        let mut neighbors = vec![(4, 1.0), (2, 0.5), (1, 1.0), (3, 0.5)];
        sort_neighbors(&mut neighbors);
        assert_eq!(neighbors, vec![(2, 0.5), (3, 0.5), (1, 1.0), (4, 1.0)]);
    }
}
