use std::path::Path;

use flatgen_error::{FlatgenError, FlatgenResult};

pub const DEFAULT_WORDS_PATH: &str = "/usr/share/dict/words";
pub const DEFAULT_MIN_WORD_LENGTH: usize = 4;

/// The candidate words for name fields, in the order they appear in their source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordList {
    words: Vec<String>,
}

impl WordList {
    /// Loads a newline-delimited word list, keeping words longer than `min_length` bytes.
    pub fn load(path: impl AsRef<Path>, min_length: usize) -> FlatgenResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            FlatgenError::from(e).with_context(format!("reading word list {}", path.display()))
        })?;
        Ok(Self::from_bytes(&bytes, min_length))
    }

    pub fn from_text(text: &str, min_length: usize) -> Self {
        Self::from_bytes(text.as_bytes(), min_length)
    }

    /// Splits `bytes` on `\n`, dropping a trailing `\r` from each line.
    ///
    /// Lines are filtered on their raw byte length. Only the survivors are decoded, with
    /// invalid UTF-8 replaced rather than rejected, since system dictionaries are not always
    /// UTF-8 encoded.
    pub fn from_bytes(bytes: &[u8], min_length: usize) -> Self {
        Self {
            words: bytes
                .split(|&b| b == b'\n')
                .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
                .filter(|line| line.len() > min_length)
                .map(|line| String::from_utf8_lossy(line).into_owned())
                .collect(),
        }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rstest::rstest;
    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn keeps_words_strictly_longer_than_minimum() {
        let text = "a\nfour\nfives\nsixsix\n\nfour\nabcde";
        let list = WordList::from_text(text, 4);
        assert_eq!(list.words(), ["fives", "sixsix", "abcde"]);

        for word in text.lines() {
            assert_eq!(list.words().iter().any(|w| w == word), word.len() > 4);
        }
    }

    #[test]
    fn strips_carriage_returns() {
        let list = WordList::from_text("apple\r\nbanana\r\n", 4);
        assert_eq!(list.words(), ["apple", "banana"]);
    }

    #[test]
    fn length_is_measured_in_bytes() {
        // "café" is four characters but five bytes
        let list = WordList::from_text("café\ncafe", 4);
        assert_eq!(list.words(), ["café"]);
    }

    #[test]
    fn loads_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "zebra\ncat\nelephant").unwrap();

        let list = WordList::load(file.path(), 3).unwrap();
        assert_eq!(list.len(), 2);
        assert!(!list.is_empty());
        assert_eq!(list.words(), ["zebra", "elephant"]);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"na\xefve-word\nplain\n").unwrap();

        let list = WordList::load(file.path(), 4).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.words()[0], "na\u{FFFD}ve-word");
        assert_eq!(list.words()[1], "plain");
    }

    #[rstest]
    #[case(b"\xff\xffab\nplain\n", &["plain"])]
    #[case(b"\xff\xffabc\nplain\n", &["\u{FFFD}\u{FFFD}abc", "plain"])]
    #[case(b"\xffab\r\nfives\r\n", &["fives"])]
    fn invalid_bytes_count_at_their_raw_length(#[case] bytes: &[u8], #[case] expected: &[&str]) {
        let list = WordList::from_bytes(bytes, 4);
        assert_eq!(list.words(), expected);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = WordList::load("/definitely/not/a/word/list", 4).unwrap_err();
        assert!(matches!(err.root(), FlatgenError::Io(_)));
        assert!(err.to_string().starts_with("reading word list /definitely/not/a/word/list"));
    }
}
