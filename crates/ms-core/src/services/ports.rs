use std::collections::{BTreeMap, HashSet};

use crate::error::{ManuscriptError, Result};
use crate::models::{Manuscript, PortReservation, PortRole};

/// Map every non-zero port of `jobs` to the job and role claiming it.
///
/// A port claimed twice is a configuration error; the scan stops at the
/// first conflict and reports the role held by the first claimant.
pub fn find_reserved_ports(jobs: &[Manuscript]) -> Result<BTreeMap<u16, PortReservation>> {
    let mut reserved: BTreeMap<u16, PortReservation> = BTreeMap::new();

    for job in jobs {
        for role in PortRole::ALL {
            let port = job.port_for(role);
            if port == 0 {
                continue;
            }
            if let Some(existing) = reserved.get(&port) {
                return Err(ManuscriptError::PortConflict {
                    port,
                    first: existing.manuscript_name.clone(),
                    second: job.name.clone(),
                    role: existing.role,
                });
            }
            reserved.insert(
                port,
                PortReservation {
                    port,
                    manuscript_name: job.name.clone(),
                    role,
                },
            );
        }
    }

    Ok(reserved)
}

/// Check that none of `candidate`'s explicit ports belong to another job.
///
/// Ports already reserved under the candidate's own name are a redeploy and
/// pass.
pub fn validate_port_assignments(candidate: &Manuscript, jobs: &[Manuscript]) -> Result<()> {
    let reserved = find_reserved_ports(jobs)?;

    for role in PortRole::ALL {
        let port = candidate.port_for(role);
        if port == 0 {
            continue;
        }
        if let Some(reservation) = reserved.get(&port) {
            if reservation.manuscript_name != candidate.name {
                return Err(ManuscriptError::PortReserved {
                    port,
                    owner: reservation.manuscript_name.clone(),
                    role: reservation.role,
                });
            }
        }
    }

    Ok(())
}

/// Lowest port in the inclusive range `[start, end]` not in `unavailable`.
pub fn find_available_port(
    role: PortRole,
    start: u16,
    end: u16,
    unavailable: &HashSet<u16>,
) -> Result<u16> {
    (start..=end)
        .find(|port| !unavailable.contains(port))
        .ok_or(ManuscriptError::PortsExhausted { role, start, end })
}

/// Validate `job` against the stored jobs and fill each unset port from its
/// role's range, avoiding `occupied` ports and every existing reservation.
pub fn initialize_ports(
    job: &mut Manuscript,
    jobs: &[Manuscript],
    occupied: &HashSet<u16>,
) -> Result<()> {
    validate_port_assignments(job, jobs)?;

    let mut unavailable: HashSet<u16> = occupied.clone();
    unavailable.extend(find_reserved_ports(jobs)?.into_keys());
    unavailable.extend(
        PortRole::ALL
            .iter()
            .map(|role| job.port_for(*role))
            .filter(|port| *port != 0),
    );

    for role in PortRole::ALL {
        if job.port_for(role) != 0 {
            continue;
        }
        let (start, end) = role.range();
        let port = find_available_port(role, start, end, &unavailable)?;
        tracing::debug!(job = %job.name, %role, port, "port_allocated");
        job.set_port(role, port);
        unavailable.insert(port);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(name: &str, port: u16, graphql_port: u16, db_port: u16) -> Manuscript {
        let mut ms: Manuscript = serde_yaml::from_str(&format!("name: {name}\n")).unwrap();
        ms.port = port;
        ms.graphql_port = graphql_port;
        ms.db_port = db_port;
        ms
    }

    #[test]
    fn index_contains_every_non_zero_port() {
        let jobs = vec![job("a", 8081, 8082, 15432), job("b", 8083, 0, 15433)];
        let reserved = find_reserved_ports(&jobs).unwrap();
        assert_eq!(reserved.len(), 5);
        assert_eq!(reserved[&8081].manuscript_name, "a");
        assert_eq!(reserved[&8081].role, PortRole::Service);
        assert_eq!(reserved[&8082].role, PortRole::Query);
        assert_eq!(reserved[&15433].manuscript_name, "b");
        assert_eq!(reserved[&15433].role, PortRole::Database);
        assert!(!reserved.contains_key(&0));
    }

    #[test]
    fn index_of_empty_list_is_empty() {
        assert!(find_reserved_ports(&[]).unwrap().is_empty());
    }

    #[test]
    fn shared_port_names_both_jobs_and_first_role() {
        let jobs = vec![job("a", 0, 9000, 0), job("b", 9000, 0, 0)];
        match find_reserved_ports(&jobs) {
            Err(ManuscriptError::PortConflict {
                port,
                first,
                second,
                role,
            }) => {
                assert_eq!(port, 9000);
                assert_eq!(first, "a");
                assert_eq!(second, "b");
                assert_eq!(role, PortRole::Query);
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn validation_rejects_port_owned_by_other_job() {
        let existing = vec![job("existing", 8090, 8081, 15440)];
        let candidate = job("new", 8081, 0, 0);
        let err = validate_port_assignments(&candidate, &existing).unwrap_err();
        match &err {
            ManuscriptError::PortReserved { port, owner, role } => {
                assert_eq!(*port, 8081);
                assert_eq!(owner, "existing");
                assert_eq!(*role, PortRole::Query);
            }
            other => panic!("expected reservation error, got {other:?}"),
        }
        assert!(err.to_string().contains("query-endpoint"));
    }

    #[test]
    fn validation_allows_redeploy_of_same_name() {
        let existing = vec![job("demo", 8081, 8082, 15432)];
        let candidate = job("demo", 8081, 8082, 15432);
        assert!(validate_port_assignments(&candidate, &existing).is_ok());
    }

    #[test]
    fn allocator_skips_forbidden_prefix() {
        for k in 0..5u16 {
            let forbidden: HashSet<u16> = (100..100 + k).collect();
            let port = find_available_port(PortRole::Service, 100, 103, &forbidden);
            if 100 + k <= 103 {
                assert_eq!(port.unwrap(), 100 + k);
            } else {
                assert!(matches!(
                    port,
                    Err(ManuscriptError::PortsExhausted {
                        start: 100,
                        end: 103,
                        ..
                    })
                ));
            }
        }
    }

    #[test]
    fn exhaustion_names_the_range() {
        let forbidden: HashSet<u16> = (8081..=8181).collect();
        let err = find_available_port(PortRole::Service, 8081, 8181, &forbidden).unwrap_err();
        assert!(err.to_string().contains("8081-8181"));
    }

    #[test]
    fn fresh_job_gets_range_starts() {
        let mut ms = job("fresh", 0, 0, 0);
        initialize_ports(&mut ms, &[], &HashSet::new()).unwrap();
        assert_eq!((ms.port, ms.graphql_port, ms.db_port), (8081, 8082, 15432));
    }

    #[test]
    fn roles_never_share_a_port() {
        // 8081 busy: service takes 8082, so query must move on to 8083.
        let occupied: HashSet<u16> = [8081].into_iter().collect();
        let mut ms = job("fresh", 0, 0, 0);
        initialize_ports(&mut ms, &[], &occupied).unwrap();
        assert_eq!(ms.port, 8082);
        assert_eq!(ms.graphql_port, 8083);
        assert_ne!(ms.port, ms.graphql_port);
    }

    #[test]
    fn allocation_avoids_existing_reservations() {
        let existing = vec![job("other", 8081, 8082, 15432)];
        let mut ms = job("fresh", 0, 0, 0);
        initialize_ports(&mut ms, &existing, &HashSet::new()).unwrap();
        assert_eq!((ms.port, ms.graphql_port, ms.db_port), (8083, 8084, 15433));
    }

    #[test]
    fn preset_ports_are_kept() {
        let mut ms = job("fresh", 9001, 0, 0);
        initialize_ports(&mut ms, &[], &HashSet::new()).unwrap();
        assert_eq!(ms.port, 9001);
        assert_eq!(ms.graphql_port, 8082);
    }

    #[test]
    fn preset_port_is_not_handed_to_another_role() {
        let mut ms = job("x", 8082, 0, 0);
        initialize_ports(&mut ms, &[], &HashSet::new()).unwrap();
        assert_eq!(ms.port, 8082);
        assert_eq!(ms.graphql_port, 8083);
        assert_eq!(ms.db_port, 15432);
    }
}
