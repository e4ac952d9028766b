use crate::errors::TickArrayError;
use crate::math::tick::{
    is_tick_index_in_bounds, tick_array_start_index, MAX_TICK_INDEX, MIN_TICK_INDEX,
    TICK_ARRAY_SIZE,
};
use std::collections::BTreeMap;

const TICK_ARRAY_LEN: usize = TICK_ARRAY_SIZE as usize;

/// Liquidity bookkeeping for a single initializable tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick {
    pub initialized: bool,
    /// Liquidity added when the price crosses this tick upwards.
    pub liquidity_net: i128,
    /// Total liquidity referencing this tick.
    pub liquidity_gross: u128,
    pub fee_growth_outside_a: u128,
    pub fee_growth_outside_b: u128,
}

impl Tick {
    #[must_use]
    pub fn new_initialized(liquidity_net: i128, liquidity_gross: u128) -> Self {
        Self {
            initialized: true,
            liquidity_net,
            liquidity_gross,
            ..Self::default()
        }
    }
}

/// Fixed-size window of ticks starting at `start_tick_index`.
///
/// Slot `i` holds the tick at `start_tick_index + i * tick_spacing`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickArray {
    start_tick_index: i32,
    tick_spacing: u16,
    #[cfg_attr(feature = "serde", serde(with = "serde_big_array::BigArray"))]
    ticks: [Tick; TICK_ARRAY_LEN],
}

impl TickArray {
    /// Creates an array of uninitialized ticks.
    pub fn new(start_tick_index: i32, tick_spacing: u16) -> Result<Self, TickArrayError> {
        if tick_spacing == 0 {
            return Err(TickArrayError::ZeroTickSpacing);
        }

        let ticks_in_array = TICK_ARRAY_SIZE * i32::from(tick_spacing);
        let lowest_start = tick_array_start_index(MIN_TICK_INDEX, tick_spacing);
        if start_tick_index % ticks_in_array != 0
            || start_tick_index < lowest_start
            || start_tick_index > MAX_TICK_INDEX
        {
            return Err(TickArrayError::InvalidStartTickIndex {
                start_tick_index,
                tick_spacing,
            });
        }

        Ok(Self {
            start_tick_index,
            tick_spacing,
            ticks: [Tick::default(); TICK_ARRAY_LEN],
        })
    }

    /// Builder-style [`TickArray::set_tick`] for an initialized tick.
    pub fn with_initialized_tick(
        mut self,
        tick_index: i32,
        liquidity_net: i128,
        liquidity_gross: u128,
    ) -> Result<Self, TickArrayError> {
        self.set_tick(tick_index, Tick::new_initialized(liquidity_net, liquidity_gross))?;
        Ok(self)
    }

    pub fn set_tick(&mut self, tick_index: i32, tick: Tick) -> Result<(), TickArrayError> {
        let offset = self.tick_offset(tick_index)?;
        self.ticks[offset] = tick;
        Ok(())
    }

    #[must_use]
    pub fn start_tick_index(&self) -> i32 {
        self.start_tick_index
    }

    #[must_use]
    pub fn tick_spacing(&self) -> u16 {
        self.tick_spacing
    }

    #[must_use]
    pub fn ticks_in_array(&self) -> i32 {
        TICK_ARRAY_SIZE * i32::from(self.tick_spacing)
    }

    /// First tick index past this array.
    #[must_use]
    pub fn end_tick_index(&self) -> i32 {
        self.start_tick_index + self.ticks_in_array()
    }

    #[must_use]
    pub fn is_min_tick_array(&self) -> bool {
        self.start_tick_index <= MIN_TICK_INDEX
    }

    #[must_use]
    pub fn is_max_tick_array(&self) -> bool {
        self.end_tick_index() > MAX_TICK_INDEX
    }

    /// Ticks searched from `tick_index`. Upward searches start after the current tick, so their
    /// window is shifted down by one tick spacing.
    #[must_use]
    pub fn in_search_range(&self, tick_index: i32, shifted: bool) -> bool {
        let shift = if shifted {
            i32::from(self.tick_spacing)
        } else {
            0
        };
        tick_index >= self.start_tick_index - shift && tick_index < self.end_tick_index() - shift
    }

    /// Slot of an initializable tick within this array.
    pub fn tick_offset(&self, tick_index: i32) -> Result<usize, TickArrayError> {
        let spacing = i32::from(self.tick_spacing);
        if !is_tick_index_in_bounds(tick_index) || tick_index % spacing != 0 {
            return Err(TickArrayError::TickNotInitializable {
                tick_index,
                tick_spacing: self.tick_spacing,
            });
        }
        if tick_index < self.start_tick_index || tick_index >= self.end_tick_index() {
            return Err(TickArrayError::TickNotInArray {
                tick_index,
                start_tick_index: self.start_tick_index,
            });
        }

        // bounded by TICK_ARRAY_SIZE above
        Ok(((tick_index - self.start_tick_index) / spacing) as usize)
    }

    pub fn tick(&self, tick_index: i32) -> Result<&Tick, TickArrayError> {
        Ok(&self.ticks[self.tick_offset(tick_index)?])
    }

    /// Initialized ticks in ascending order together with their tick index.
    pub fn initialized_ticks(&self) -> impl Iterator<Item = (i32, &Tick)> + '_ {
        let spacing = i32::from(self.tick_spacing);
        self.ticks
            .iter()
            .enumerate()
            .filter(|(_, tick)| tick.initialized)
            .map(move |(offset, tick)| (self.start_tick_index + offset as i32 * spacing, tick))
    }

    /// Next initialized tick in this array in the direction of the swap.
    ///
    /// Downward searches include the tick containing `tick_index`, upward searches do not.
    pub fn next_initialized_tick_index(
        &self,
        tick_index: i32,
        a_to_b: bool,
    ) -> Result<Option<i32>, TickArrayError> {
        if !self.in_search_range(tick_index, !a_to_b) {
            return Err(TickArrayError::TickNotInArray {
                tick_index,
                start_tick_index: self.start_tick_index,
            });
        }

        let spacing = i32::from(self.tick_spacing);
        let mut offset = (tick_index - self.start_tick_index).div_euclid(spacing);
        if !a_to_b {
            offset += 1;
        }

        while (0..TICK_ARRAY_SIZE).contains(&offset) {
            if self.ticks[offset as usize].initialized {
                return Ok(Some(self.start_tick_index + offset * spacing));
            }
            offset = if a_to_b { offset - 1 } else { offset + 1 };
        }

        Ok(None)
    }
}

/// Sum of `liquidity_net` over every initialized tick, `None` on overflow.
#[must_use]
pub fn liquidity_net_sum(tick_arrays: &[TickArray]) -> Option<i128> {
    tick_arrays
        .iter()
        .flat_map(TickArray::initialized_ticks)
        .try_fold(0i128, |sum, (_, tick)| sum.checked_add(tick.liquidity_net))
}

/// Whether every position opened in `tick_arrays` is also closed in them.
#[must_use]
pub fn check_liquidity_conservation(tick_arrays: &[TickArray]) -> bool {
    liquidity_net_sum(tick_arrays) == Some(0)
}

/// Contiguous run of tick arrays in swap order, starting at the array holding the current tick.
#[derive(Debug, Clone)]
pub struct TickArraySequence<'a> {
    arrays: Vec<&'a TickArray>,
    tick_spacing: u16,
}

impl<'a> TickArraySequence<'a> {
    /// Orders an unordered set of arrays for a swap from `tick_current_index`.
    ///
    /// Arrays that are not contiguous with the current one are ignored. The sequence is empty if
    /// the array holding the current tick was not supplied.
    pub fn new(
        tick_arrays: &'a [TickArray],
        tick_spacing: u16,
        tick_current_index: i32,
        a_to_b: bool,
    ) -> Result<Self, TickArrayError> {
        let mut by_start: BTreeMap<i32, &'a TickArray> = BTreeMap::new();
        for tick_array in tick_arrays {
            if tick_array.tick_spacing != tick_spacing {
                return Err(TickArrayError::TickSpacingMismatch {
                    expected: tick_spacing,
                    actual: tick_array.tick_spacing,
                });
            }
            if by_start
                .insert(tick_array.start_tick_index, tick_array)
                .is_some()
            {
                return Err(TickArrayError::DuplicateTickArray {
                    start_tick_index: tick_array.start_tick_index,
                });
            }
        }

        let first = by_start
            .values()
            .find(|tick_array| tick_array.in_search_range(tick_current_index, !a_to_b))
            .copied();

        let mut arrays = Vec::new();
        let mut next = first;
        while let Some(tick_array) = next {
            arrays.push(tick_array);
            let following_start = if a_to_b {
                tick_array.start_tick_index - tick_array.ticks_in_array()
            } else {
                tick_array.end_tick_index()
            };
            next = by_start.get(&following_start).copied();
        }

        Ok(Self {
            arrays,
            tick_spacing,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    /// Start indices in traversal order.
    pub fn start_tick_indexes(&self) -> impl Iterator<Item = i32> + '_ {
        self.arrays.iter().map(|tick_array| tick_array.start_tick_index)
    }

    /// Initialized tick at `tick_index` in the array at `array_index`, if any.
    #[must_use]
    pub fn initialized_tick(&self, array_index: usize, tick_index: i32) -> Option<&'a Tick> {
        self.arrays
            .get(array_index)
            .and_then(|&tick_array| tick_array.tick(tick_index).ok())
            .filter(|tick| tick.initialized)
    }

    #[must_use]
    pub fn tick_offset(&self, array_index: usize, tick_index: i32) -> Option<usize> {
        self.arrays
            .get(array_index)
            .and_then(|tick_array| tick_array.tick_offset(tick_index).ok())
    }

    /// Where the next swap step from `tick_index` stops, as `(array_index, tick_index)`.
    ///
    /// This is the next initialized tick, or a boundary: the global min/max tick once the
    /// outermost array is searched, otherwise the edge of the last supplied array. `None` means
    /// the search started past the supplied arrays.
    #[must_use]
    pub fn next_initialized_tick_index(
        &self,
        tick_index: i32,
        a_to_b: bool,
        start_array_index: usize,
    ) -> Option<(usize, i32)> {
        let mut search_index = tick_index;
        let mut array_index = start_array_index;

        loop {
            let tick_array = self.arrays.get(array_index)?;
            let next = tick_array
                .next_initialized_tick_index(search_index, a_to_b)
                .ok()?;

            if let Some(next_index) = next {
                return Some((array_index, next_index));
            }

            if a_to_b && tick_array.is_min_tick_array() {
                return Some((array_index, MIN_TICK_INDEX));
            }
            if !a_to_b && tick_array.is_max_tick_array() {
                return Some((array_index, MAX_TICK_INDEX));
            }

            if array_index + 1 == self.arrays.len() {
                let edge = if a_to_b {
                    tick_array.start_tick_index
                } else {
                    tick_array.end_tick_index() - i32::from(self.tick_spacing)
                };
                return Some((array_index, edge));
            }

            search_index = if a_to_b {
                tick_array.start_tick_index - 1
            } else {
                tick_array.end_tick_index() - 1
            };
            array_index += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK_SPACING: u16 = 64;
    const WIDTH: i32 = 5632;

    fn tick_arrays() -> Vec<TickArray> {
        vec![
            TickArray::new(0, TICK_SPACING)
                .and_then(|a| a.with_initialized_tick(1280, -2_000_000, 2_000_000))
                .and_then(|a| a.with_initialized_tick(2816, -8_000_000, 8_000_000))
                .unwrap(),
            TickArray::new(-WIDTH, TICK_SPACING)
                .and_then(|a| a.with_initialized_tick(-2816, 10_000_000, 10_000_000))
                .unwrap(),
            TickArray::new(WIDTH, TICK_SPACING).unwrap(),
        ]
    }

    mod tick_array {
        use super::*;

        #[test]
        fn start_index_validation() {
            assert!(TickArray::new(WIDTH * 2, TICK_SPACING).is_ok());
            assert_eq!(
                TickArray::new(64, TICK_SPACING),
                Err(TickArrayError::InvalidStartTickIndex {
                    start_tick_index: 64,
                    tick_spacing: TICK_SPACING
                })
            );
            assert_eq!(TickArray::new(0, 0), Err(TickArrayError::ZeroTickSpacing));
            assert!(TickArray::new(tick_array_start_index(MIN_TICK_INDEX, 64), 64).is_ok());
            assert!(TickArray::new(tick_array_start_index(MIN_TICK_INDEX, 64) - WIDTH, 64).is_err());
        }

        #[test]
        fn min_and_max_arrays() {
            let min = TickArray::new(tick_array_start_index(MIN_TICK_INDEX, 64), 64).unwrap();
            let max = TickArray::new(tick_array_start_index(MAX_TICK_INDEX, 64), 64).unwrap();
            assert!(min.is_min_tick_array());
            assert!(!min.is_max_tick_array());
            assert!(max.is_max_tick_array());
            assert!(!max.is_min_tick_array());
        }

        #[test]
        fn tick_access() {
            let arrays = tick_arrays();
            assert_eq!(arrays[0].tick(1280).unwrap().liquidity_net, -2_000_000);
            assert!(!arrays[0].tick(64).unwrap().initialized);
            assert_eq!(arrays[0].tick_offset(5568), Ok(87));
            assert_eq!(
                arrays[0].tick(100),
                Err(TickArrayError::TickNotInitializable {
                    tick_index: 100,
                    tick_spacing: 64
                })
            );
            assert_eq!(
                arrays[0].tick(WIDTH),
                Err(TickArrayError::TickNotInArray {
                    tick_index: WIDTH,
                    start_tick_index: 0
                })
            );
        }

        #[test]
        fn set_tick_stores_new_initialized() {
            let tick = Tick::new_initialized(-2_000_000, 2_000_000);
            assert!(tick.initialized);
            assert_eq!(tick.fee_growth_outside_a, 0);

            let mut array = TickArray::new(0, 64).unwrap();
            array.set_tick(1280, tick).unwrap();
            assert_eq!(array.tick(1280), Ok(&tick));
            assert_eq!(array.tick(1280), tick_arrays()[0].tick(1280));
        }

        #[test]
        fn initialized_ticks_in_order() {
            let arrays = tick_arrays();
            let ticks: Vec<(i32, i128)> = arrays[0]
                .initialized_ticks()
                .map(|(index, tick)| (index, tick.liquidity_net))
                .collect();
            assert_eq!(ticks, vec![(1280, -2_000_000), (2816, -8_000_000)]);
        }

        #[test]
        fn search_down_includes_current_tick() {
            let arrays = tick_arrays();
            assert_eq!(arrays[0].next_initialized_tick_index(1280, true), Ok(Some(1280)));
            assert_eq!(arrays[0].next_initialized_tick_index(1300, true), Ok(Some(1280)));
            assert_eq!(arrays[0].next_initialized_tick_index(1279, true), Ok(None));
        }

        #[test]
        fn search_up_excludes_current_tick() {
            let arrays = tick_arrays();
            assert_eq!(arrays[0].next_initialized_tick_index(1280, false), Ok(Some(2816)));
            assert_eq!(arrays[0].next_initialized_tick_index(-1, false), Ok(Some(1280)));
            assert_eq!(arrays[0].next_initialized_tick_index(2816, false), Ok(None));
        }

        #[test]
        fn search_outside_range() {
            let arrays = tick_arrays();
            assert!(arrays[0].next_initialized_tick_index(-1, true).is_err());
            assert!(arrays[0].next_initialized_tick_index(5568, false).is_err());
        }

        #[test]
        fn conservation() {
            let arrays = tick_arrays();
            assert!(check_liquidity_conservation(&arrays));
            assert!(!check_liquidity_conservation(&arrays[..1]));
            assert_eq!(liquidity_net_sum(&arrays[..1]), Some(-10_000_000));
        }
    }

    mod sequence {
        use super::*;

        #[test]
        fn orders_unordered_arrays() {
            let arrays = tick_arrays();
            let up = TickArraySequence::new(&arrays, TICK_SPACING, 0, false).unwrap();
            assert_eq!(up.start_tick_indexes().collect::<Vec<_>>(), vec![0, WIDTH]);
            let down = TickArraySequence::new(&arrays, TICK_SPACING, 0, true).unwrap();
            assert_eq!(down.start_tick_indexes().collect::<Vec<_>>(), vec![0, -WIDTH]);
        }

        #[test]
        fn shifted_start_for_upward_swaps() {
            let arrays = tick_arrays();
            // tick -1 sits below array 0, but its first upward candidate is tick 0
            let up = TickArraySequence::new(&arrays, TICK_SPACING, -1, false).unwrap();
            assert_eq!(up.start_tick_indexes().next(), Some(0));
            let down = TickArraySequence::new(&arrays, TICK_SPACING, -1, true).unwrap();
            assert_eq!(down.start_tick_indexes().next(), Some(-WIDTH));
        }

        #[test]
        fn missing_current_array_is_empty() {
            let arrays = tick_arrays();
            let sequence = TickArraySequence::new(&arrays, TICK_SPACING, 3 * WIDTH, true).unwrap();
            assert!(sequence.is_empty());
            assert_eq!(sequence.next_initialized_tick_index(3 * WIDTH, true, 0), None);
        }

        #[test]
        fn rejects_bad_input() {
            let mut arrays = tick_arrays();
            arrays.push(TickArray::new(0, TICK_SPACING).unwrap());
            assert_eq!(
                TickArraySequence::new(&arrays, TICK_SPACING, 0, true).unwrap_err(),
                TickArrayError::DuplicateTickArray {
                    start_tick_index: 0
                }
            );

            let other = vec![TickArray::new(0, 8).unwrap()];
            assert_eq!(
                TickArraySequence::new(&other, TICK_SPACING, 0, true).unwrap_err(),
                TickArrayError::TickSpacingMismatch {
                    expected: 64,
                    actual: 8
                }
            );
        }

        #[test]
        fn finds_ticks_across_arrays() {
            let arrays = tick_arrays();
            let down = TickArraySequence::new(&arrays, TICK_SPACING, 0, true).unwrap();
            assert_eq!(down.next_initialized_tick_index(0, true, 0), Some((1, -2816)));

            let up = TickArraySequence::new(&arrays, TICK_SPACING, 0, false).unwrap();
            assert_eq!(up.next_initialized_tick_index(0, false, 0), Some((0, 1280)));
            assert_eq!(up.next_initialized_tick_index(1280, false, 0), Some((0, 2816)));
        }

        #[test]
        fn coverage_edge() {
            let arrays = tick_arrays();
            let up = TickArraySequence::new(&arrays, TICK_SPACING, 2816, false).unwrap();
            // last tick of the last supplied array
            assert_eq!(
                up.next_initialized_tick_index(2816, false, 0),
                Some((1, 2 * WIDTH - 64))
            );
            assert_eq!(up.next_initialized_tick_index(2 * WIDTH - 64, false, 2), None);

            let down = TickArraySequence::new(&arrays, TICK_SPACING, -2817, true).unwrap();
            assert_eq!(down.next_initialized_tick_index(-2817, true, 0), Some((0, -WIDTH)));
        }

        #[test]
        fn global_bounds() {
            let min_start = tick_array_start_index(MIN_TICK_INDEX, TICK_SPACING);
            let arrays = vec![TickArray::new(min_start, TICK_SPACING).unwrap()];
            let current = MIN_TICK_INDEX + 100;
            let down = TickArraySequence::new(&arrays, TICK_SPACING, current, true).unwrap();
            assert_eq!(
                down.next_initialized_tick_index(current, true, 0),
                Some((0, MIN_TICK_INDEX))
            );

            let max_start = tick_array_start_index(MAX_TICK_INDEX, TICK_SPACING);
            let arrays = vec![TickArray::new(max_start, TICK_SPACING).unwrap()];
            let up = TickArraySequence::new(&arrays, TICK_SPACING, max_start, false).unwrap();
            assert_eq!(
                up.next_initialized_tick_index(max_start, false, 0),
                Some((0, MAX_TICK_INDEX))
            );
        }

        #[test]
        fn initialized_tick_lookup() {
            let arrays = tick_arrays();
            let up = TickArraySequence::new(&arrays, TICK_SPACING, 0, false).unwrap();
            assert_eq!(up.initialized_tick(0, 1280).map(|t| t.liquidity_net), Some(-2_000_000));
            assert!(up.initialized_tick(0, 64).is_none());
            assert!(up.initialized_tick(0, MAX_TICK_INDEX).is_none());
            assert_eq!(up.tick_offset(1, WIDTH), Some(0));
        }
    }
}
