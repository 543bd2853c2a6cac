/// Calls `visit` with every `k`-subset of `0..n` in lexicographic order.
pub fn for_each_combination<F>(n: usize, k: usize, mut visit: F)
where
    F: FnMut(&[usize]),
{
    if k > n {
        return;
    }
    let mut current = Vec::with_capacity(k);
    combinations(n, k, 0, &mut current, &mut visit);
}

/// Calls `visit` with every ordered `k`-arrangement of distinct indices from
/// `0..n` in lexicographic order.
pub fn for_each_permutation<F>(n: usize, k: usize, mut visit: F)
where
    F: FnMut(&[usize]),
{
    if k > n {
        return;
    }
    let mut current = Vec::with_capacity(k);
    let mut used = vec![false; n];
    permutations(n, k, &mut current, &mut used, &mut visit);
}

/// Number of candidates an exhaustive search visits for subset size `k`:
/// C(m, k) * o! / (o - k)!.
pub fn candidate_count(m: usize, o: usize, k: usize) -> u128 {
    if k > m || k > o {
        return 0;
    }
    let choose = (0..k as u128).fold(1u128, |acc, i| acc * (m as u128 - i) / (i + 1));
    let arrange = (0..k as u128).fold(1u128, |acc, i| acc.saturating_mul(o as u128 - i));
    choose.saturating_mul(arrange)
}

fn combinations<F>(n: usize, k: usize, start: usize, current: &mut Vec<usize>, visit: &mut F)
where
    F: FnMut(&[usize]),
{
    if current.len() == k {
        visit(current.as_slice());
        return;
    }
    let remaining = k - current.len();
    for i in start..=(n - remaining) {
        current.push(i);
        combinations(n, k, i + 1, current, visit);
        current.pop();
    }
}

fn permutations<F>(n: usize, k: usize, current: &mut Vec<usize>, used: &mut [bool], visit: &mut F)
where
    F: FnMut(&[usize]),
{
    if current.len() == k {
        visit(current.as_slice());
        return;
    }
    for i in 0..n {
        if used[i] {
            continue;
        }
        used[i] = true;
        current.push(i);
        permutations(n, k, current, used, visit);
        current.pop();
        used[i] = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect_combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
        let mut out = vec![];
        for_each_combination(n, k, |c| out.push(c.to_vec()));
        out
    }

    fn collect_permutations(n: usize, k: usize) -> Vec<Vec<usize>> {
        let mut out = vec![];
        for_each_permutation(n, k, |p| out.push(p.to_vec()));
        out
    }

    #[test]
    fn test_combinations() {
        assert_eq!(
            collect_combinations(4, 2),
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3]
            ]
        );
        assert_eq!(collect_combinations(3, 3), vec![vec![0, 1, 2]]);
        assert_eq!(collect_combinations(3, 0), vec![Vec::<usize>::new()]);
        assert!(collect_combinations(2, 3).is_empty());
    }

    #[test]
    fn test_permutations() {
        assert_eq!(
            collect_permutations(3, 2),
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![1, 0],
                vec![1, 2],
                vec![2, 0],
                vec![2, 1]
            ]
        );
        assert_eq!(collect_permutations(4, 4).len(), 24);
        assert!(collect_permutations(1, 2).is_empty());
    }

    #[test]
    fn test_candidate_count() {
        assert_eq!(candidate_count(5, 3, 3), 10 * 6);
        assert_eq!(candidate_count(4, 4, 2), 6 * 12);
        assert_eq!(candidate_count(2, 4, 3), 0);
    }
}
