use crate::model::{ClaimElement, ElementType};

/// Edit-distance alignment: `1 - levenshtein(a, b) / max(len(a), len(b))`.
/// Unit cost for insert, delete and substitute. Either side empty scores 0.0.
pub fn alignment<T: PartialEq>(a: &[T], b: &[T]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let longer = a.len().max(b.len());
    let distance = levenshtein(a, b);
    (1.0 - distance as f64 / longer as f64).clamp(0.0, 1.0)
}

/// Alignment of the element-type sequences of two element lists, so that
/// apparatus lines up with apparatus and step with step.
pub fn element_type_alignment(a: &[ClaimElement], b: &[ClaimElement]) -> f64 {
    let types_a: Vec<ElementType> = a.iter().map(|e| e.element_type).collect();
    let types_b: Vec<ElementType> = b.iter().map(|e| e.element_type).collect();
    alignment(&types_a, &types_b)
}

fn levenshtein<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];
    for (i, x) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, y) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(x != y);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
