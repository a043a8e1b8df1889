use aivis_core::{DetectedMention, EntityType};

/// Sort mentions by offset and number the brand mentions 1, 2, 3, ...
///
/// The sort is stable, so mentions at the same offset keep their scan order.
/// Competitor mentions are left unranked.
pub fn rank_positions(mentions: &mut [DetectedMention]) {
    mentions.sort_by_key(|m| m.char_position);

    let mut next = 1u32;
    for mention in mentions.iter_mut() {
        mention.position_rank = match mention.entity_type {
            EntityType::Brand => {
                let rank = next;
                next += 1;
                Some(rank)
            }
            EntityType::Competitor => None,
        };
    }
}

#[cfg(test)]
mod tests {
    use aivis_core::Sentiment;

    use super::*;

    fn mention(name: &str, entity_type: EntityType, pos: usize) -> DetectedMention {
        DetectedMention {
            entity_name: name.to_string(),
            entity_type,
            sentiment: Sentiment::Neutral,
            context_snippet: String::new(),
            char_position: pos,
            is_recommendation: false,
            position_rank: None,
        }
    }

    #[test]
    fn ranks_follow_position_not_insertion_order() {
        let mut mentions = vec![
            mention("Acme", EntityType::Brand, 300),
            mention("Globex", EntityType::Competitor, 5),
            mention("Acme", EntityType::Brand, 10),
            mention("Acme CRM", EntityType::Brand, 120),
        ];
        rank_positions(&mut mentions);

        let ranked: Vec<(usize, Option<u32>)> = mentions
            .iter()
            .map(|m| (m.char_position, m.position_rank))
            .collect();
        assert_eq!(
            ranked,
            vec![(5, None), (10, Some(1)), (120, Some(2)), (300, Some(3))]
        );
    }

    #[test]
    fn competitors_never_ranked() {
        let mut mentions = vec![
            mention("Globex", EntityType::Competitor, 0),
            mention("Initech", EntityType::Competitor, 20),
        ];
        rank_positions(&mut mentions);
        assert!(mentions.iter().all(|m| m.position_rank.is_none()));
    }

    #[test]
    fn equal_offsets_keep_scan_order() {
        let mut mentions = vec![
            mention("Acme", EntityType::Brand, 4),
            mention("Acme CRM", EntityType::Brand, 4),
        ];
        rank_positions(&mut mentions);
        assert_eq!(mentions[0].entity_name, "Acme");
        assert_eq!(mentions[0].position_rank, Some(1));
        assert_eq!(mentions[1].position_rank, Some(2));
    }
}
