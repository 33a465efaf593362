/// TF-IDF with log-normalized term frequency and smoothed IDF.
///
/// `tf` is the term's occurrence count within one field of one document,
/// `df` the number of postings referencing the term, `total_docs` the
/// corpus size. Degenerate corpora (df or total_docs of zero) score 0.
pub fn tf_idf(tf: u32, df: u32, total_docs: u64) -> f32 {
    if df == 0 || total_docs == 0 {
        return 0.0;
    }
    let tf_component = if tf > 0 { 1.0 + (tf as f32).ln() } else { 0.0 };
    let idf_component = (1.0 + total_docs as f32 / df as f32).ln();
    tf_component * idf_component
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_df_or_empty_corpus_scores_zero() {
        assert_eq!(tf_idf(5, 0, 100), 0.0);
        assert_eq!(tf_idf(5, 3, 0), 0.0);
        assert_eq!(tf_idf(0, 0, 0), 0.0);
    }

    #[test]
    fn zero_tf_scores_zero() {
        assert_eq!(tf_idf(0, 3, 100), 0.0);
    }

    #[test]
    fn strictly_increasing_in_tf() {
        let total_docs = 1000;
        let df = 10;
        let mut prev = tf_idf(1, df, total_docs);
        for tf in 2..50 {
            let next = tf_idf(tf, df, total_docs);
            assert!(next > prev, "tf={tf}: {next} <= {prev}");
            prev = next;
        }
    }

    #[test]
    fn strictly_decreasing_in_df() {
        let total_docs = 1000;
        let tf = 3;
        let mut prev = tf_idf(tf, 1, total_docs);
        for df in 2..1000 {
            let next = tf_idf(tf, df, total_docs);
            assert!(next < prev, "df={df}: {next} >= {prev}");
            prev = next;
        }
    }
}
