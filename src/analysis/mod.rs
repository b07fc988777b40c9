pub mod content;
pub mod stopwords;
pub mod word;
