#[cfg(test)]
mod tests {
    use time::{Duration, OffsetDateTime};
    use uuid::Uuid;
    use crate::{
        tally, validate_election_request, CandidateInput, CreateElectionRequest, Election,
        ElectionError, ElectionRecord, ElectionStatus, ElectionSummary, ElectionView, Principal,
        ValidationError, MAX_CANDIDATES, MAX_TITLE_LENGTH,
    };

    fn t0() -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(1_760_000_000).unwrap()
    }

    fn candidate(name: &str) -> CandidateInput {
        CandidateInput { name: name.into(), party: None, photo: None }
    }

    fn request(names: &[&str]) -> CreateElectionRequest {
        CreateElectionRequest {
            title: "Student council".into(),
            starts_at: t0(),
            ends_at: t0() + Duration::hours(1),
            candidates: names.iter().map(|n| candidate(n)).collect(),
        }
    }

    fn election(names: &[&str]) -> Election {
        let draft = validate_election_request(&request(names)).unwrap();
        Election::new(Uuid::new_v4(), draft, t0() - Duration::days(1))
    }

    fn vote(e: &mut Election, voter: &str, idx: i64) -> Result<(), ElectionError> {
        e.record_vote(voter, idx, t0() + Duration::minutes(30))
    }

    fn tally_sum(e: &Election) -> u64 {
        e.candidates().iter().map(|c| c.vote_count).sum()
    }

    #[test]
    fn test_request_normalization() {
        let mut req = request(&["  Ada ", "", "   ", "Grace"]);
        req.title = "  Board vote  ".into();
        req.candidates[0].party = Some("  Analytical ".into());
        req.candidates[3].party = Some("   ".into());

        let draft = validate_election_request(&req).unwrap();
        assert_eq!(draft.title, "Board vote");
        assert_eq!(draft.candidates.len(), 2);
        assert_eq!(draft.candidates[0].name, "Ada");
        assert_eq!(draft.candidates[0].party.as_deref(), Some("Analytical"));
        assert_eq!(draft.candidates[1].party, None);
    }

    #[test]
    fn test_request_rejections() {
        let mut req = request(&["A"]);
        req.ends_at = req.starts_at;
        assert_eq!(validate_election_request(&req), Err(ValidationError::InvalidSchedule));

        let mut req = request(&["A"]);
        req.title = "   ".into();
        assert_eq!(validate_election_request(&req), Err(ValidationError::EmptyTitle));

        let mut req = request(&["A"]);
        req.title = "x".repeat(MAX_TITLE_LENGTH + 1);
        assert_eq!(validate_election_request(&req), Err(ValidationError::TitleTooLong));

        let req = request(&["", "  "]);
        assert_eq!(validate_election_request(&req), Err(ValidationError::NoCandidates));

        let names: Vec<String> = (0..=MAX_CANDIDATES).map(|i| format!("C{i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        assert_eq!(validate_election_request(&request(&refs)), Err(ValidationError::TooManyCandidates));
    }

    #[test]
    fn test_schedule_checked_before_title() {
        let mut req = request(&[]);
        req.title = String::new();
        req.ends_at = req.starts_at - Duration::minutes(1);
        let err: ElectionError = validate_election_request(&req).unwrap_err().into();
        assert_eq!(err, ElectionError::InvalidSchedule);
    }

    #[test]
    fn test_validation_error_mapping() {
        assert!(matches!(ElectionError::from(ValidationError::TitleTooLong), ElectionError::InvalidTitle(_)));
        assert_eq!(ElectionError::from(ValidationError::NoCandidates), ElectionError::NoCandidates);
        assert!(matches!(
            ElectionError::from(ValidationError::PartyTooLong("p".into())),
            ElectionError::InvalidCandidates(_)
        ));
    }

    #[test]
    fn test_new_election_starts_empty() {
        let e = election(&["A", "B"]);
        assert_eq!(e.total_votes(), 0);
        assert_eq!(e.version(), 0);
        assert!(e.voted_by().is_empty());
        assert!(e.candidates().iter().all(|c| c.vote_count == 0));
    }

    #[test]
    fn test_plurality_round_trip() {
        let mut e = election(&["A", "B", "C"]);
        for (voter, idx) in [("v1", 0), ("v2", 0), ("v3", 0), ("v4", 1), ("v5", 1)] {
            vote(&mut e, voter, idx).unwrap();
        }
        assert_eq!(e.total_votes(), 5);
        assert_eq!(tally_sum(&e), 5);
        assert_eq!(e.version(), 5);

        assert_eq!(tally::winner(&e, t0() + Duration::minutes(59)), None);
        let winner = tally::winner(&e, t0() + Duration::minutes(61)).unwrap();
        assert_eq!((winner.index, winner.name.as_str(), winner.votes), (0, "A", 3));
    }

    #[test]
    fn test_vote_precondition_order() {
        let mut e = election(&["A"]);
        let before = t0() - Duration::seconds(1);
        let after = t0() + Duration::minutes(61);

        assert_eq!(e.record_vote("v", 9, before), Err(ElectionError::NotActive(ElectionStatus::Upcoming)));
        assert_eq!(e.record_vote("v", 9, after), Err(ElectionError::NotActive(ElectionStatus::Ended)));
        assert_eq!(vote(&mut e, "v", 9), Err(ElectionError::InvalidCandidate(9)));
        assert_eq!(vote(&mut e, "v", -1), Err(ElectionError::InvalidCandidate(-1)));
        assert_eq!(e.record_vote("v", -1, after), Err(ElectionError::NotActive(ElectionStatus::Ended)));

        vote(&mut e, "v", 0).unwrap();
        assert_eq!(vote(&mut e, "v", 9), Err(ElectionError::AlreadyVoted));
    }

    #[test]
    fn test_failed_vote_changes_nothing() {
        let mut e = election(&["A", "B"]);
        vote(&mut e, "v1", 1).unwrap();
        let snapshot = e.clone();

        assert!(vote(&mut e, "v2", 2).is_err());
        assert!(vote(&mut e, "v1", 0).is_err());
        assert!(e.record_vote("v3", 0, t0() + Duration::hours(2)).is_err());
        assert_eq!(e, snapshot);
    }

    #[test]
    fn test_tie_goes_to_first_candidate() {
        let mut e = election(&["A", "B", "C"]);
        vote(&mut e, "v1", 2).unwrap();
        vote(&mut e, "v2", 1).unwrap();
        let ended = t0() + Duration::hours(2);
        assert_eq!(tally::winner(&e, ended).map(|w| w.index), Some(1));

        let standings = tally::standings(e.candidates());
        let order: Vec<_> = standings.iter().map(|s| s.index).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn test_winner_without_votes() {
        let e = election(&["A", "B"]);
        let w = tally::winner(&e, t0() + Duration::hours(2)).unwrap();
        assert_eq!((w.index, w.votes), (0, 0));
    }

    #[test]
    fn test_result_hides_winner_until_ended() {
        let mut e = election(&["A", "B"]);
        vote(&mut e, "v1", 1).unwrap();
        let running = tally::result(&e, t0() + Duration::minutes(45));
        assert_eq!(running.status, ElectionStatus::Active);
        assert_eq!(running.winner, None);
        assert_eq!(running.standings[0].name, "B");

        let done = tally::result(&e, t0() + Duration::hours(3));
        assert_eq!(done.winner.map(|w| w.name), Some("B".to_string()));
    }

    #[test]
    fn test_view_reflects_viewer_and_phase() {
        let mut e = election(&["A"]);
        vote(&mut e, "alice", 0).unwrap();
        let now = t0() + Duration::minutes(30);

        let view = ElectionView::at(&e, now, Some("alice"));
        assert_eq!(view.status, ElectionStatus::Active);
        assert_eq!(view.has_voted, Some(true));
        assert_eq!(view.voter_count, 1);
        assert_eq!(view.countdown.map(|c| c.total_seconds), Some(30 * 60));

        let anonymous = ElectionView::at(&e, now, None);
        assert_eq!(anonymous.has_voted, None);
        assert_eq!(ElectionView::at(&e, now, Some("bob")).has_voted, Some(false));

        let upcoming = ElectionView::at(&e, t0() - Duration::minutes(5), None);
        assert_eq!(upcoming.countdown.map(|c| c.minutes), Some(5));
    }

    #[test]
    fn test_summary_counts_phases() {
        let a = election(&["A"]);
        let mut b = election(&["B"]);
        b.starts_at = t0() + Duration::hours(5);
        b.ends_at = t0() + Duration::hours(6);
        let mut c = election(&["C"]);
        c.starts_at = t0() - Duration::hours(5);
        c.ends_at = t0() - Duration::hours(4);

        let summary = ElectionSummary::of([&a, &b, &c], t0());
        assert_eq!((summary.total, summary.upcoming, summary.active, summary.ended), (3, 1, 1, 1));
    }

    #[test]
    fn test_record_round_trip_and_corruption() {
        let mut e = election(&["A", "B"]);
        vote(&mut e, "v1", 0).unwrap();

        let json = serde_json::to_string(&e).unwrap();
        let back: Election = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);

        let mut record: ElectionRecord = e.to_record();
        record.total_votes = 2;
        assert!(Election::try_from(record).is_err());

        let mut record = e.to_record();
        record.voted_by.push("v1".into());
        assert!(Election::try_from(record).is_err());

        let mut record = e.to_record();
        record.ends_at = record.starts_at;
        assert!(Election::try_from(record).is_err());
    }

    #[test]
    fn test_principal_from_headers() {
        let p = Principal::from_headers(Some(" alice "), Some("user, admin,,")).unwrap();
        assert_eq!(p.identity, "alice");
        assert!(p.has_role("admin"));
        assert!(p.has_role("user"));
        assert_eq!(p.roles.len(), 2);

        assert!(Principal::from_headers(Some("  "), Some("admin")).is_none());
        assert!(Principal::from_headers(None, None).is_none());
        assert!(Principal::from_headers(Some("bob"), None).unwrap().roles.is_empty());
    }
}
