//! Walk through the life of a ballot in the sample election: encrypt, audit, cast
use helios_elgamal::{
    ballot::vote::{DecodedVote, EncryptedVote},
    rng::platform_source,
    samples,
};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut rng = platform_source();
    let ready = Arc::new(AtomicBool::new(false));
    let flag = ready.clone();
    rng.autoseed(Some(Box::new(move || flag.store(true, Ordering::SeqCst))));
    if !ready.load(Ordering::SeqCst) {
        panic!("no entropy available on this platform");
    }

    let election = samples::election().unwrap();
    let pk = election.get_public_key();
    println!(
        "election {} ({})",
        election.get_name(),
        election.hash().unwrap()
    );

    // A ballot the voter chooses to audit: its randomness is revealed, and it is never cast
    let spoiled = EncryptedVote::new(&election, &[vec![0], vec![1, 2]], rng.as_mut()).unwrap();
    let trail = spoiled.get_audit_trail().unwrap();
    match EncryptedVote::decode(&trail.vote, &election).unwrap() {
        DecodedVote::Unsealed(audited) => {
            let reopened: Vec<Vec<usize>> = audited
                .get_encrypted_answers()
                .iter()
                .map(|answer| answer.get_selection().to_vec())
                .collect();
            if reopened != trail.plaintext_answers {
                panic!("audit trail does not open to the selections");
            }
            println!("audited ballot encrypts {:?}", reopened);
        }
        DecodedVote::Sealed(_) => panic!("audit trail carries no randomness"),
    }

    // The ballot that is cast
    let vote = EncryptedVote::new(&election, &[vec![1], vec![2]], rng.as_mut()).unwrap();
    let cast = vote.clear_plaintexts();
    let mut checked = 0;
    let valid = cast.verify_proofs(pk, |_| checked += 1).unwrap();
    let questions = election.get_questions();
    if !valid || !cast.verify_encryption(questions, pk).unwrap() {
        panic!("cast ballot does not verify");
    }
    println!("cast ballot verified ({} progress reports)", checked);
    println!("{}", cast.to_json_value().unwrap());
}
