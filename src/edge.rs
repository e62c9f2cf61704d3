use num_traits::Float;

use crate::{
    Direction, MeasureError, MeasureResult, SampleSeries,
    annotation::{AnnotationClass, AnnotationKind},
    helper::cast,
    level_search::first_matching,
};

/// Sense of a level crossing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeSense {
    /// Crossing upwards
    Rising,
    /// Crossing downwards
    Falling,
}

impl EdgeSense {
    /// Returns `true` if `value` is on the far side of `threshold` for this sense
    #[inline]
    pub fn is_past<T: Float>(self, value: T, threshold: T) -> bool {
        match self {
            EdgeSense::Rising => value >= threshold,
            EdgeSense::Falling => value <= threshold,
        }
    }
}

/// Parameters of an edge search between explicit `vlow`/`vhigh` levels
///
/// `vhigh` has no sensible default and must be set; the search fails with
/// `MissingParameter` otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeQuery<T> {
    /// Upper level
    vhigh: Option<T>,
    /// Lower level
    vlow: T,
    /// Fraction of `vhigh - vlow` above `vlow` where the edge is declared
    level_ratio: T,
    /// First sample searched
    start_index: usize,
}

impl<T: Float> EdgeQuery<T> {
    /// Creates a query with `vlow = 0`, a 50% level ratio and no `vhigh`
    pub fn new() -> Self {
        let _2 = T::one() + T::one();
        Self {
            vhigh: None,
            vlow: T::zero(),
            level_ratio: T::one() / _2,
            start_index: 0,
        }
    }

    /// Creates a query for a 50% edge between `vlow` and `vhigh`
    pub fn between(vlow: T, vhigh: T) -> Self {
        let mut query = Self::new();
        query.set_vlow(vlow).set_vhigh(vhigh);
        query
    }

    /// Sets the upper level
    pub fn set_vhigh(&mut self, vhigh: T) -> &mut Self {
        self.vhigh = Some(vhigh);
        self
    }

    /// Sets the lower level
    pub fn set_vlow(&mut self, vlow: T) -> &mut Self {
        self.vlow = vlow;
        self
    }

    /// Sets the level ratio
    pub fn set_level_ratio(&mut self, level_ratio: T) -> &mut Self {
        self.level_ratio = level_ratio;
        self
    }

    /// Sets the first sample searched
    pub fn set_start_index(&mut self, start_index: usize) -> &mut Self {
        self.start_index = start_index;
        self
    }

    /// Checks the query against a series of `len` samples
    ///
    /// # Returns
    ///
    /// * `MeasureResult<(T, T)>` - `(vlow, vhigh)` when the query is usable
    fn validate(&self, len: usize) -> MeasureResult<(T, T)> {
        let vhigh = self.vhigh.ok_or(MeasureError::MissingParameter("vhigh"))?;
        if self.vlow >= vhigh || self.vlow.is_nan() || vhigh.is_nan() {
            return Err(MeasureError::InvalidRange);
        }
        if self.start_index >= len {
            return Err(MeasureError::OutOfRange {
                index: self.start_index,
                len,
            });
        }
        Ok((self.vlow, vhigh))
    }
}

impl<T: Float> Default for EdgeQuery<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A located level crossing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge<T> {
    /// Sample index
    pub index: usize,
    /// Sample time
    pub time: T,
    /// Sample value
    pub value: T,
    /// `(value - vlow) / (vhigh - vlow)`
    pub normalized_level: T,
}

/// Realized 10/90-style switching interval around a 50% edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwitchingTime<T> {
    /// Normalized level of the sample chosen for the low crossing
    pub lo_ratio: T,
    /// Normalized level of the sample chosen for the high crossing
    pub hi_ratio: T,
    /// Time from the first crossing to the second in edge direction
    pub elapsed: T,
}

#[inline]
fn normalized<T: Float>(value: T, vlow: T, vhigh: T) -> T {
    (value - vlow) / (vhigh - vlow)
}

impl<T: Float + Default> SampleSeries<T> {
    fn edge_at(&self, index: usize, vlow: T, vhigh: T) -> Edge<T> {
        Edge {
            index,
            time: self.times[index],
            value: self.values[index],
            normalized_level: normalized(self.values[index], vlow, vhigh),
        }
    }

    /// Locates the first crossing of `vlow + level_ratio * (vhigh - vlow)` in
    /// the given sense.
    ///
    /// When the record already sits past the threshold at `start_index`, the
    /// search first walks forward to the first sample back on the near side and
    /// only then looks for the crossing, so a record that begins above the
    /// threshold does not report its first sample as a rising edge.
    pub fn find_edge(
        &self,
        query: &EdgeQuery<T>,
        sense: EdgeSense,
    ) -> MeasureResult<Option<Edge<T>>> {
        let (vlow, vhigh) = query.validate(self.len())?;
        let threshold = vlow + query.level_ratio * (vhigh - vlow);
        let last = self.last_index();

        let mut from = query.start_index;
        if sense.is_past(self.values[from], threshold) {
            let near_side = |v: T| !sense.is_past(v, threshold);
            match first_matching(&self.values, from, last, Direction::Forward, near_side) {
                Some(clear) => from = clear,
                None => {
                    log::debug!("{sense:?} edge: record stays past the threshold");
                    return Ok(None);
                }
            }
        }

        let index = match sense {
            EdgeSense::Rising => self.first_at_or_above(threshold, from, last, Direction::Forward),
            EdgeSense::Falling => self.first_at_or_below(threshold, from, last, Direction::Forward),
        };
        log::debug!("{sense:?} edge at {index:?}");

        Ok(index.map(|index| {
            self.record(
                AnnotationKind::Level { value: threshold },
                "edge level",
                AnnotationClass::Threshold,
            );
            self.mark(index, "edge", AnnotationClass::Edge);
            self.edge_at(index, vlow, vhigh)
        }))
    }

    /// Locates the first rising crossing described by `query`
    ///
    /// # Arguments
    ///
    /// * `query` - Levels, ratio and start index
    ///
    /// # Returns
    ///
    /// * `MeasureResult<Option<Edge<T>>>` - The edge, `None` if the record never
    ///   crosses, or a parameter error
    ///
    /// # Examples
    ///
    /// ```
    /// use waveform_measure::{EdgeQuery, SampleSeries};
    ///
    /// let times = vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
    /// let series = SampleSeries::new(times, vec![9.0, 9.0, 1.0, 1.0, 9.0, 9.0]).unwrap();
    ///
    /// let edge = series
    ///     .find_first_rising_edge(EdgeQuery::new().set_vhigh(10.0))
    ///     .unwrap()
    ///     .unwrap();
    /// assert_eq!(edge.index, 4);
    /// assert_eq!(edge.normalized_level, 0.9);
    /// ```
    pub fn find_first_rising_edge(&self, query: &EdgeQuery<T>) -> MeasureResult<Option<Edge<T>>> {
        self.find_edge(query, EdgeSense::Rising)
    }

    /// Locates the first falling crossing described by `query`
    pub fn find_first_falling_edge(&self, query: &EdgeQuery<T>) -> MeasureResult<Option<Edge<T>>> {
        self.find_edge(query, EdgeSense::Falling)
    }

    /// Index of the sample representing `ratio` on the edge through `anchor`.
    ///
    /// Ratios on the far side of the anchor are searched forward and the first
    /// sample past the level is returned. Ratios on the near side are searched
    /// backward for the first sample not yet past the level, and the sample
    /// after it is returned, so both directions land on the first sample past
    /// the level in time order.
    fn crossing_around(
        &self,
        anchor: &Edge<T>,
        ratio: T,
        vlow: T,
        vhigh: T,
        sense: EdgeSense,
    ) -> Option<usize> {
        let threshold = vlow + ratio * (vhigh - vlow);
        let forward = match sense {
            EdgeSense::Rising => ratio >= anchor.normalized_level,
            EdgeSense::Falling => ratio <= anchor.normalized_level,
        };

        let last = self.last_index();
        match (sense, forward) {
            (EdgeSense::Rising, true) => {
                self.first_at_or_above(threshold, anchor.index, last, Direction::Forward)
            }
            (EdgeSense::Falling, true) => {
                self.first_at_or_below(threshold, anchor.index, last, Direction::Forward)
            }
            (EdgeSense::Rising, false) => self
                .first_at_or_below(threshold, anchor.index, 0, Direction::Backward)
                .map(|i| i + 1),
            (EdgeSense::Falling, false) => self
                .first_at_or_above(threshold, anchor.index, 0, Direction::Backward)
                .map(|i| i + 1),
        }
    }

    fn switching_time(
        &self,
        lo_lvl: T,
        hi_lvl: T,
        vhigh: T,
        vlow: T,
        sense: EdgeSense,
    ) -> MeasureResult<Option<SwitchingTime<T>>> {
        let mut query = EdgeQuery::between(vlow, vhigh);
        query.set_level_ratio(cast(0.5)?);
        let anchor = self
            .find_edge(&query, sense)?
            .ok_or(MeasureError::Edge50NotFound)?;

        let lo = self.crossing_around(&anchor, lo_lvl, vlow, vhigh, sense);
        let hi = self.crossing_around(&anchor, hi_lvl, vlow, vhigh, sense);
        let (lo, hi) = match lo.zip(hi) {
            Some(pair) => pair,
            None => {
                log::warn!("{sense:?} switching time unavailable: lo {lo:?}, hi {hi:?}");
                return Ok(None);
            }
        };

        let (first, second) = match sense {
            EdgeSense::Rising => (lo, hi),
            EdgeSense::Falling => (hi, lo),
        };
        self.span(first, second, "switching time");

        Ok(Some(SwitchingTime {
            lo_ratio: normalized(self.values[lo], vlow, vhigh),
            hi_ratio: normalized(self.values[hi], vlow, vhigh),
            elapsed: self.times[second] - self.times[first],
        }))
    }

    /// Rise time between the `lo_lvl` and `hi_lvl` ratios of `vlow..vhigh`,
    /// anchored on the first rising 50% crossing
    ///
    /// # Returns
    ///
    /// * `MeasureResult<Option<SwitchingTime<T>>>` - The realized ratios and the
    ///   elapsed time, `None` with a warning when a crossing is missing, or
    ///   `Edge50NotFound` when there is no 50% crossing to anchor on
    pub fn sw_rise_time(
        &self,
        lo_lvl: T,
        hi_lvl: T,
        vhigh: T,
        vlow: T,
    ) -> MeasureResult<Option<SwitchingTime<T>>> {
        self.switching_time(lo_lvl, hi_lvl, vhigh, vlow, EdgeSense::Rising)
    }

    /// Fall time between the `hi_lvl` and `lo_lvl` ratios of `vlow..vhigh`,
    /// anchored on the first falling 50% crossing
    pub fn sw_fall_time(
        &self,
        lo_lvl: T,
        hi_lvl: T,
        vhigh: T,
        vlow: T,
    ) -> MeasureResult<Option<SwitchingTime<T>>> {
        self.switching_time(lo_lvl, hi_lvl, vhigh, vlow, EdgeSense::Falling)
    }
}
