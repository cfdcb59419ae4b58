use tracing::trace;

use crate::{
    coordinate::{Coordinate, Quadrant},
    node::QuadNode,
    picture::Error,
};

/// Blocks at least this wide have their quadrants compressed on the rayon
/// thread pool when parallel compression is enabled.
pub const PARALLEL_THRESHOLD: usize = 64;

/// Build the quadtree for a square matrix of pixels.
///
/// `pixels` must be `side`×`side` and `side` must be a power of two.
pub fn compress(pixels: &[Vec<u8>], side: usize, parallel: bool) -> QuadNode {
    let root = compress_region(pixels, Coordinate::ORIGIN, side, parallel);
    trace!(side, nodes = root.node_count(), "built quadtree");

    root
}

/// Check whether every pixel in the `size`×`size` block at `start` matches
/// the pixel at `start`. Stops at the first mismatch.
fn is_uniform(pixels: &[Vec<u8>], start: Coordinate, size: usize) -> bool {
    let value = pixels[start.row()][start.col()];
    let cols = start.col()..start.col() + size;

    pixels[start.row()..start.row() + size]
        .iter()
        .all(|row| row[cols.clone()].iter().all(|&p| p == value))
}

fn compress_region(pixels: &[Vec<u8>], start: Coordinate, size: usize, parallel: bool) -> QuadNode {
    if size == 1 || is_uniform(pixels, start, size) {
        return QuadNode::Leaf(pixels[start.row()][start.col()]);
    }

    let half = size / 2;
    let region = |quadrant: Quadrant| {
        compress_region(pixels, start.offset(quadrant, half), half, parallel)
    };

    if parallel && size >= PARALLEL_THRESHOLD {
        // Joined results are put back in quadrant order, so the tree is the
        // same one the sequential path builds.
        let ((ul, ur), (ll, lr)) = rayon::join(
            || rayon::join(|| region(Quadrant::UpperLeft), || region(Quadrant::UpperRight)),
            || rayon::join(|| region(Quadrant::LowerLeft), || region(Quadrant::LowerRight)),
        );

        QuadNode::split(ul, ur, ll, lr)
    } else {
        QuadNode::from_children(Quadrant::ALL.map(region))
    }
}

/// Rebuild the `side`×`side` matrix described by a quadtree.
pub fn decompress(root: &QuadNode, side: usize) -> Result<Vec<Vec<u8>>, Error> {
    let mut pixels = vec![vec![0u8; side]; side];
    fill_region(&mut pixels, Coordinate::ORIGIN, side, root)?;

    Ok(pixels)
}

fn fill_region(
    pixels: &mut [Vec<u8>],
    start: Coordinate,
    size: usize,
    node: &QuadNode,
) -> Result<(), Error> {
    match node {
        QuadNode::Leaf(value) => {
            for row in &mut pixels[start.row()..start.row() + size] {
                row[start.col()..start.col() + size].fill(*value);
            }
        }
        QuadNode::Split(children) => {
            if size == 1 {
                return Err(Error::Format(format!(
                    "split node at {start} subdivides a single pixel"
                )));
            }

            let half = size / 2;
            for (quadrant, child) in Quadrant::ALL.into_iter().zip(children.iter()) {
                fill_region(pixels, start.offset(quadrant, half), half, child)?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(side: usize, flat: &[u8]) -> Vec<Vec<u8>> {
        flat.chunks(side).map(|row| row.to_vec()).collect()
    }

    #[test]
    fn uniform_block_scans_own_columns() {
        // Left half is uniform, right half is not. A scan that mixes up the
        // row and column ranges would look at the wrong cells.
        let pixels = matrix(4, &[
            5, 5, 1, 2,
            5, 5, 3, 4,
            9, 9, 9, 9,
            9, 9, 9, 9,
        ]);

        assert!(is_uniform(&pixels, Coordinate::new(0, 0), 2));
        assert!(!is_uniform(&pixels, Coordinate::new(0, 2), 2));
        assert!(is_uniform(&pixels, Coordinate::new(2, 0), 2));
        assert!(is_uniform(&pixels, Coordinate::new(2, 2), 2));
        assert!(!is_uniform(&pixels, Coordinate::ORIGIN, 4));
    }

    #[test]
    fn nested_split() {
        let pixels = matrix(4, &[
            5, 5, 1, 2,
            5, 5, 3, 4,
            9, 9, 9, 9,
            9, 9, 9, 9,
        ]);

        let root = compress(&pixels, 4, false);

        assert_eq!(
            root,
            QuadNode::split(
                QuadNode::leaf(5),
                QuadNode::split(
                    QuadNode::leaf(1),
                    QuadNode::leaf(2),
                    QuadNode::leaf(3),
                    QuadNode::leaf(4),
                ),
                QuadNode::leaf(9),
                QuadNode::leaf(9),
            )
        );
        assert_eq!(decompress(&root, 4).unwrap(), pixels);
    }

    #[test]
    fn parallel_matches_sequential() {
        let side = 256;
        let pixels: Vec<Vec<u8>> = (0..side)
            .map(|r| (0..side).map(|c| ((r / 8) ^ (c / 16)) as u8).collect())
            .collect();

        let sequential = compress(&pixels, side, false);
        let parallel = compress(&pixels, side, true);

        assert_eq!(sequential, parallel);
        assert_eq!(decompress(&parallel, side).unwrap(), pixels);
    }

    #[test]
    fn split_below_single_pixel() {
        let root = QuadNode::split(
            QuadNode::split(
                QuadNode::leaf(1),
                QuadNode::leaf(2),
                QuadNode::leaf(3),
                QuadNode::leaf(4),
            ),
            QuadNode::leaf(0),
            QuadNode::leaf(0),
            QuadNode::leaf(0),
        );

        assert!(matches!(decompress(&root, 2), Err(Error::Format(_))));
    }
}
