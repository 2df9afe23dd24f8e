//! Vector helpers for cosine scoring

/// Scale `v` to unit length in place. Zero vectors stay zero.
///
/// Components are divided by the largest magnitude first so squaring
/// cannot overflow for large finite inputs.
pub fn normalize(v: &mut [f32]) {
    let scale = v.iter().fold(0.0f32, |m, x| m.max(x.abs()));
    if scale == 0.0 || !scale.is_finite() {
        return;
    }
    let norm = v.iter().map(|x| (x / scale) * (x / scale)).sum::<f32>().sqrt();
    if !norm.is_finite() {
        return;
    }
    for x in v.iter_mut() {
        *x = *x / scale / norm;
    }
}

/// Dot product; equals cosine similarity for unit vectors
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Index and value of the maximum score.
///
/// The lowest index wins exact ties. NaN never wins. Returns `None` for
/// an empty slice or one with only NaN.
pub fn best_match(scores: &[f32]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &score) in scores.iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((i, score)),
        }
    }
    best
}
