//! The two line oriented text formats.
//!
//! A raw image is one pixel value per line, row-major:
//! ```text
//! 1
//! 2
//! 3
//! 4
//! ```
//!
//! A compressed image starts with the total pixel count, followed by a
//! preorder walk of the quadtree with one node per line. A split node is
//! written as [SPLIT_SENTINEL] and is immediately followed by its four
//! children in [Quadrant::ALL](crate::coordinate::Quadrant::ALL) order:
//! ```text
//! 4
//! -1
//! 1
//! 2
//! 3
//! 4
//! ```

use std::io::{BufRead, Lines, Write};

use crate::{node::QuadNode, picture::Error};

/// Value marking a split node in a compressed file. Lies outside the
/// valid pixel range so it can never be mistaken for a leaf.
pub const SPLIT_SENTINEL: i64 = -1;

/// Reads one integer per line, skipping blank lines and keeping track of
/// line numbers for error messages.
pub struct ValueReader<R: BufRead> {
    lines: Lines<R>,
    line: usize,
}

impl<R: BufRead> ValueReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            lines: input.lines(),
            line: 0,
        }
    }

    /// Line number of the last value returned.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Read the next value, or `None` at the end of the input.
    pub fn next_value(&mut self) -> Result<Option<i64>, Error> {
        for text in self.lines.by_ref() {
            let text = text?;
            self.line += 1;

            let token = text.trim();
            if token.is_empty() {
                continue;
            }

            return token
                .parse()
                .map(Some)
                .map_err(|source| Error::ParseInt {
                    line: self.line,
                    token: token.to_string(),
                    source,
                });
        }

        Ok(None)
    }

    /// Read the next value, failing if the input has ended.
    fn expect_value(&mut self, what: &str) -> Result<i64, Error> {
        self.next_value()?.ok_or_else(|| {
            Error::Format(format!("unexpected end of input after line {} while reading {what}", self.line))
        })
    }

    fn next_pixel(&mut self) -> Result<Option<u8>, Error> {
        match self.next_value()? {
            Some(value) => pixel(value, self.line).map(Some),
            None => Ok(None),
        }
    }
}

fn pixel(value: i64, line: usize) -> Result<u8, Error> {
    u8::try_from(value).map_err(|_| {
        Error::Format(format!("pixel value {value} on line {line} is outside 0-255"))
    })
}

/// Find the side length of a square image holding `count` pixels.
///
/// The count must be a non-zero perfect square whose root is a power of
/// two.
pub fn side_for_count(count: usize) -> Result<usize, Error> {
    if count == 0 {
        return Err(Error::Format("image has no pixels".to_string()));
    }

    let side = (count as f64).sqrt().round() as usize;
    if side.checked_mul(side) != Some(count) {
        return Err(Error::Format(format!("pixel count {count} is not a perfect square")));
    }

    if !side.is_power_of_two() {
        return Err(Error::Dimension(side));
    }

    Ok(side)
}

/// Read every pixel of a raw image, in file order.
pub fn read_raw<R: BufRead>(input: R) -> Result<Vec<u8>, Error> {
    let mut reader = ValueReader::new(input);

    let mut pixels = Vec::new();
    while let Some(value) = reader.next_pixel()? {
        pixels.push(value);
    }

    Ok(pixels)
}

/// Write a pixel matrix as a raw image.
pub fn write_raw<W: Write>(output: &mut W, pixels: &[Vec<u8>]) -> Result<(), Error> {
    for value in pixels.iter().flatten() {
        writeln!(output, "{value}")?;
    }

    Ok(())
}

/// Read the pixel count line of a compressed image and return it with the
/// side length it implies.
pub fn read_header<R: BufRead>(reader: &mut ValueReader<R>) -> Result<(usize, usize), Error> {
    let declared = reader.expect_value("the pixel count")?;
    let count = usize::try_from(declared).map_err(|_| {
        Error::Format(format!("pixel count {declared} on line {} is negative", reader.line()))
    })?;

    Ok((count, side_for_count(count)?))
}

/// Read a preorder encoded quadtree describing a `side`×`side` block.
///
/// Returns the tree and the number of nodes read. Anything other than
/// blank lines after the tree is an error.
pub fn read_tree<R: BufRead>(reader: &mut ValueReader<R>, side: usize) -> Result<(QuadNode, usize), Error> {
    let mut count = 0;
    let root = read_node(reader, side, &mut count)?;

    if reader.next_value()?.is_some() {
        return Err(Error::Format(format!(
            "unexpected data on line {} after the end of the tree",
            reader.line()
        )));
    }

    Ok((root, count))
}

fn read_node<R: BufRead>(
    reader: &mut ValueReader<R>,
    size: usize,
    count: &mut usize,
) -> Result<QuadNode, Error> {
    let value = reader.expect_value("the tree")?;
    *count += 1;

    if value != SPLIT_SENTINEL {
        return Ok(QuadNode::Leaf(pixel(value, reader.line())?));
    }

    // Also bounds the recursion depth for hostile input
    if size <= 1 {
        return Err(Error::Format(format!(
            "split node on line {} subdivides a single pixel",
            reader.line()
        )));
    }

    let half = size / 2;
    let ul = read_node(reader, half, count)?;
    let ur = read_node(reader, half, count)?;
    let ll = read_node(reader, half, count)?;
    let lr = read_node(reader, half, count)?;

    Ok(QuadNode::split(ul, ur, ll, lr))
}

/// Write the preorder encoding of a quadtree. Returns the number of nodes
/// written.
pub fn write_tree<W: Write>(output: &mut W, node: &QuadNode) -> Result<usize, Error> {
    match node {
        QuadNode::Leaf(value) => {
            writeln!(output, "{value}")?;
            Ok(1)
        }
        QuadNode::Split(children) => {
            writeln!(output, "{SPLIT_SENTINEL}")?;

            let mut count = 1;
            for child in children.iter() {
                count += write_tree(output, child)?;
            }

            Ok(count)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn reader(text: &str) -> ValueReader<Cursor<&[u8]>> {
        ValueReader::new(Cursor::new(text.as_bytes()))
    }

    #[test]
    fn sides() {
        assert_eq!(side_for_count(1).unwrap(), 1);
        assert_eq!(side_for_count(4).unwrap(), 2);
        assert_eq!(side_for_count(65536).unwrap(), 256);

        assert!(matches!(side_for_count(0), Err(Error::Format(_))));
        assert!(matches!(side_for_count(3), Err(Error::Format(_))));
        assert!(matches!(side_for_count(8), Err(Error::Format(_))));
        assert!(matches!(side_for_count(9), Err(Error::Dimension(3))));
        assert!(matches!(side_for_count(36), Err(Error::Dimension(6))));
    }

    #[test]
    fn raw_skips_blank_lines() {
        let pixels = read_raw(Cursor::new("1\n\n 2 \n3\r\n4".as_bytes())).unwrap();
        assert_eq!(pixels, [1, 2, 3, 4]);
    }

    #[test]
    fn raw_rejects_bad_tokens() {
        let err = read_raw(Cursor::new("1\n2\nthree\n4\n".as_bytes())).unwrap_err();
        assert!(matches!(err, Error::ParseInt { line: 3, .. }));

        let err = read_raw(Cursor::new("1\n256\n".as_bytes())).unwrap_err();
        assert!(matches!(err, Error::Format(_)));

        let err = read_raw(Cursor::new("-1\n".as_bytes())).unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }

    #[test]
    fn write_raw_row_major() {
        let mut out = Vec::new();
        write_raw(&mut out, &[vec![1, 2], vec![3, 4]]).unwrap();
        assert_eq!(out, b"1\n2\n3\n4\n");
    }

    #[test]
    fn header() {
        assert_eq!(read_header(&mut reader("16\n")).unwrap(), (16, 4));
        assert!(matches!(read_header(&mut reader("")), Err(Error::Format(_))));
        assert!(matches!(read_header(&mut reader("-4\n")), Err(Error::Format(_))));
        assert!(matches!(read_header(&mut reader("sixteen\n")), Err(Error::ParseInt { .. })));
        assert!(matches!(read_header(&mut reader("5\n")), Err(Error::Format(_))));
    }

    #[test]
    fn tree_preorder() {
        let tree = QuadNode::split(
            QuadNode::leaf(7),
            QuadNode::split(
                QuadNode::leaf(1),
                QuadNode::leaf(2),
                QuadNode::leaf(3),
                QuadNode::leaf(4),
            ),
            QuadNode::leaf(0),
            QuadNode::leaf(255),
        );

        let mut out = Vec::new();
        let written = write_tree(&mut out, &tree).unwrap();

        assert_eq!(written, 9);
        assert_eq!(String::from_utf8(out).unwrap(), "-1\n7\n-1\n1\n2\n3\n4\n0\n255\n");

        let (parsed, read) = read_tree(&mut reader("-1\n7\n-1\n1\n2\n3\n4\n0\n255\n"), 4).unwrap();
        assert_eq!(parsed, tree);
        assert_eq!(read, 9);
    }

    #[test]
    fn tree_truncated() {
        let err = read_tree(&mut reader("-1\n1\n2\n3\n"), 2).unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }

    #[test]
    fn tree_leaf_out_of_range() {
        let err = read_tree(&mut reader("-1\n1\n2\n300\n4\n"), 2).unwrap_err();
        assert!(matches!(err, Error::Format(_)));

        let err = read_tree(&mut reader("-2\n"), 2).unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }

    #[test]
    fn tree_too_deep() {
        let err = read_tree(&mut reader("-1\n-1\n1\n2\n3\n4\n5\n6\n7\n"), 2).unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }

    #[test]
    fn tree_trailing_data() {
        let err = read_tree(&mut reader("1\n2\n"), 1).unwrap_err();
        assert!(matches!(err, Error::Format(_)));

        let (tree, _) = read_tree(&mut reader("1\n\n\n"), 1).unwrap();
        assert_eq!(tree, QuadNode::leaf(1));
    }
}
