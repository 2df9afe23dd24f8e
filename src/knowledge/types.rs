//! Core knowledge base types

use serde::{Deserialize, Serialize};

/// A stored question with its curated answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

impl QaPair {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Ordered, read-only collection of pairs.
///
/// Position is the only identity a pair has: the retrieval cache is
/// index-aligned with it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    pairs: Vec<QaPair>,
}

impl KnowledgeBase {
    pub fn new(pairs: Vec<QaPair>) -> Self {
        Self { pairs }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&QaPair> {
        self.pairs.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, QaPair> {
        self.pairs.iter()
    }

    /// Stored questions in knowledge base order
    pub fn questions(&self) -> Vec<&str> {
        self.pairs.iter().map(|p| p.question.as_str()).collect()
    }
}

impl From<Vec<QaPair>> for KnowledgeBase {
    fn from(pairs: Vec<QaPair>) -> Self {
        Self::new(pairs)
    }
}

impl FromIterator<QaPair> for KnowledgeBase {
    fn from_iter<I: IntoIterator<Item = QaPair>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a KnowledgeBase {
    type Item = &'a QaPair;
    type IntoIter = std::slice::Iter<'a, QaPair>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_knowledge_base() {
        let kb = KnowledgeBase::default();
        assert!(kb.is_empty());
        assert_eq!(kb.len(), 0);
        assert!(kb.get(0).is_none());
    }

    #[test]
    fn test_questions_preserve_order() {
        let kb: KnowledgeBase = vec![
            QaPair::new("What is SOC 2?", "An audit procedure"),
            QaPair::new("What is HIPAA?", "A US health privacy law"),
        ]
        .into();

        assert_eq!(kb.questions(), vec!["What is SOC 2?", "What is HIPAA?"]);
        assert_eq!(kb.get(1).unwrap().answer, "A US health privacy law");
    }
}
