/*!
# `Raster Ingest` - Interlacing
*/



/// # GIF Passes.
///
/// Starting row and row step for each of the four GIF passes.
const GIF_PASSES: [(usize, usize); 4] = [(0, 8), (4, 8), (2, 4), (1, 2)];

/// # Adam7 Passes.
///
/// Starting column, starting row, column step, row step.
pub(crate) const ADAM7: [(usize, usize, usize, usize); 7] = [
	(0, 0, 8, 8),
	(4, 0, 8, 8),
	(0, 4, 4, 8),
	(2, 0, 4, 4),
	(0, 2, 2, 4),
	(1, 0, 2, 2),
	(0, 1, 1, 2),
];



/// # GIF Row Order.
///
/// Yield the destination row for each stored row of an interlaced GIF, in
/// storage order.
pub(crate) fn gif_rows(height: usize) -> impl Iterator<Item=usize> {
	GIF_PASSES.into_iter().flat_map(move |(start, step)| (start..height).step_by(step))
}

#[must_use]
/// # Adam7 Pass Size.
///
/// Return the width and height of the sub-image for a given pass. Either
/// may be zero, in which case the pass is absent altogether.
pub(crate) const fn adam7_size(width: usize, height: usize, pass: usize)
-> (usize, usize) {
	let (x0, y0, dx, dy) = ADAM7[pass];
	let w = if width > x0 { (width - x0).div_ceil(dx) } else { 0 };
	let h = if height > y0 { (height - y0).div_ceil(dy) } else { 0 };
	(w, h)
}

#[must_use]
/// # Adam7 Position.
///
/// Map a pass-local coordinate back to the full-resolution image.
pub(crate) const fn adam7_pos(pass: usize, x: usize, y: usize) -> (usize, usize) {
	let (x0, y0, dx, dy) = ADAM7[pass];
	(x0 + x * dx, y0 + y * dy)
}
