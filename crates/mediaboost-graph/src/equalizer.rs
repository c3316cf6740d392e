//! The fixed 5-band equalizer used in every processing chain.

use mediaboost_core::NUM_EQ_BANDS;

use crate::{
    graph::{AddEdgeError, AudioGraph, DisconnectError, NodeID},
    nodes::{BiquadFilterNode, BiquadFilterType},
};

/// The Q of every band in the bank.
pub const EQ_Q: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EqBand {
    pub filter_type: BiquadFilterType,
    pub frequency_hz: f32,
}

/// The bands of the bank in signal order.
pub const EQ_BANDS: [EqBand; NUM_EQ_BANDS] = [
    EqBand {
        filter_type: BiquadFilterType::LowShelf,
        frequency_hz: 60.0,
    },
    EqBand {
        filter_type: BiquadFilterType::Peaking,
        frequency_hz: 230.0,
    },
    EqBand {
        filter_type: BiquadFilterType::Peaking,
        frequency_hz: 910.0,
    },
    EqBand {
        filter_type: BiquadFilterType::Peaking,
        frequency_hz: 4000.0,
    },
    EqBand {
        filter_type: BiquadFilterType::HighShelf,
        frequency_hz: 14_000.0,
    },
];

/// A cascade of [`BiquadFilterNode`]s, one per entry in [`EQ_BANDS`].
///
/// The bank only holds node IDs. The nodes themselves live in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FilterBank {
    filters: [NodeID; NUM_EQ_BANDS],
}

impl FilterBank {
    /// Add the filters of a new bank to the graph. Every band starts at
    /// 0 dB. The filters are not connected.
    pub fn build(graph: &mut AudioGraph) -> Self {
        let filters = EQ_BANDS.map(|band| {
            graph.add_node(BiquadFilterNode::new(
                band.filter_type,
                band.frequency_hz,
                EQ_Q,
            ))
        });

        Self { filters }
    }

    pub fn filters(&self) -> &[NodeID; NUM_EQ_BANDS] {
        &self.filters
    }

    /// Set the gain of every band in decibels.
    ///
    /// Bands without a corresponding value are set to 0 dB. Extra values
    /// are ignored.
    pub fn apply_gains(&self, graph: &AudioGraph, values: &[f32]) {
        for (i, filter_id) in self.filters.iter().enumerate() {
            let gain_db = values.get(i).copied().unwrap_or(0.0);

            match graph.node::<BiquadFilterNode>(*filter_id) {
                Some(filter) => {
                    filter.set_gain_db(gain_db);
                }
                None => log::warn!("Equalizer filter {:?} is missing from the graph", filter_id),
            }
        }
    }

    /// The current gain of every band in decibels, or `None` if any filter
    /// is missing from the graph.
    pub fn gains(&self, graph: &AudioGraph) -> Option<[f32; NUM_EQ_BANDS]> {
        let mut gains = [0.0; NUM_EQ_BANDS];
        for (gain, filter_id) in gains.iter_mut().zip(self.filters.iter()) {
            *gain = graph.node::<BiquadFilterNode>(*filter_id)?.gain_db().value();
        }
        Some(gains)
    }

    /// Wire `source -> filters[0] -> ... -> filters[4] -> sink`.
    ///
    /// The filters are cascaded in band order. If any connection fails, the
    /// connections made by this call are removed again before the error is
    /// returned.
    pub fn connect_chain(
        &self,
        graph: &mut AudioGraph,
        source: NodeID,
        sink: NodeID,
    ) -> Result<(), AddEdgeError> {
        let mut made = Vec::with_capacity(NUM_EQ_BANDS + 1);

        let stages = std::iter::once(source)
            .chain(self.filters.iter().copied())
            .chain(std::iter::once(sink))
            .collect::<Vec<_>>();

        for pair in stages.windows(2) {
            match graph.connect(pair[0], 0, pair[1], 0, true) {
                Ok(edge_id) => made.push(edge_id),
                Err(e) => {
                    for edge_id in made {
                        graph.disconnect_by_edge_id(edge_id);
                    }
                    return Err(e);
                }
            }
        }

        Ok(())
    }

    /// Disconnect every filter from all of its outputs.
    ///
    /// Filters that were already disconnected are reported but do not stop
    /// the rest of the bank from being disconnected.
    pub fn disconnect_all(&self, graph: &mut AudioGraph) -> Vec<DisconnectError> {
        self.filters
            .iter()
            .filter_map(|filter_id| graph.disconnect_all(*filter_id).err())
            .collect()
    }

    /// Remove every filter (and any edge touching one) from the graph.
    pub fn remove(self, graph: &mut AudioGraph) {
        for filter_id in self.filters {
            if let Err(e) = graph.remove_node(filter_id) {
                log::debug!("Equalizer filter was already removed: {}", e);
            }
        }
    }

    /// The combined magnitude response of the bank at the given
    /// frequency, in decibels.
    pub fn response_db(&self, graph: &AudioGraph, freq_hz: f64, sample_rate: u32) -> f64 {
        self.filters
            .iter()
            .filter_map(|id| graph.node::<BiquadFilterNode>(*id))
            .map(|filter| filter.magnitude_response_db(freq_hz, sample_rate))
            .sum()
    }
}
