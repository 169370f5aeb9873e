use core_types::CommonSizeStatement;
use std::collections::BTreeMap;

/// Averages common-size statements across peers, per concept.
///
/// A concept's mean is taken over only the peers that reported it: a peer
/// missing a concept contributes neither a zero to the numerator nor a slot
/// in the denominator for that concept. The base concept therefore averages
/// to exactly 1.0 whenever any peer is present.
pub fn average_ratios(peers: &[CommonSizeStatement]) -> BTreeMap<String, f64> {
    let mut sums: BTreeMap<String, (f64, u32)> = BTreeMap::new();
    for peer in peers {
        for (concept, ratio) in &peer.ratios {
            let entry = sums.entry(concept.clone()).or_insert((0.0, 0));
            entry.0 += ratio;
            entry.1 += 1;
        }
    }
    sums.into_iter()
        .map(|(concept, (sum, count))| (concept, sum / count as f64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer(ratios: &[(&str, f64)]) -> CommonSizeStatement {
        CommonSizeStatement {
            base_concept: "Revenues".to_string(),
            ratios: ratios
                .iter()
                .map(|(concept, ratio)| (concept.to_string(), *ratio))
                .collect(),
        }
    }

    #[test]
    fn mean_is_conditional_on_reporting_the_concept() {
        // Peer A reports a margin, peer B does not: the margin average comes
        // from A alone while the revenue average spans both peers.
        let peers = vec![
            peer(&[("Revenues", 1.0), ("OperatingIncomeLoss", 0.1)]),
            peer(&[("Revenues", 1.0)]),
        ];
        let averaged = average_ratios(&peers);
        assert_eq!(averaged.get("Revenues"), Some(&1.0));
        assert_eq!(averaged.get("OperatingIncomeLoss"), Some(&0.1));
    }

    #[test]
    fn mean_across_reporting_peers() {
        let peers = vec![
            peer(&[("Revenues", 1.0), ("GrossProfit", 0.4)]),
            peer(&[("Revenues", 1.0), ("GrossProfit", 0.6)]),
        ];
        let averaged = average_ratios(&peers);
        assert_eq!(averaged.get("GrossProfit"), Some(&0.5));
    }

    #[test]
    fn no_peers_yields_no_ratios() {
        assert!(average_ratios(&[]).is_empty());
    }
}
