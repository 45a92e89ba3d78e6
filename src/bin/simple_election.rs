//! A sample election procedure with a single trustee

use helios_elgamal::{
    arithmetics::discrete_log,
    ballot::vote::EncryptedVote,
    proofs::challenge::FiatShamir,
    rng::{OsSource, RandomSource},
    samples,
    tally::EncryptedTally,
    BigInt,
};

const VOTERS: usize = 10;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();
    let mut rng = OsSource::new();
    let generator: FiatShamir = FiatShamir::new();

    // The trustee generates a key in the sample group and proves knowledge of the secret
    let sample = samples::election().unwrap();
    let sk = sample
        .get_public_key()
        .get_params()
        .generate(&mut rng)
        .unwrap();
    let proof = sk.prove_knowledge(&generator, &mut rng).unwrap();
    if !sk
        .get_pk()
        .verify_knowledge_of_secret_key(&proof, &generator)
    {
        panic!("Trustee failed to prove knowledge of the secret key");
    }
    let election = sample.with_public_key(sk.get_pk().clone());
    let questions = election.get_questions();

    // Every voter picks a valid selection at random, casts it, and the tally absorbs it
    let mut tally = EncryptedTally::new(&election).unwrap();
    let mut true_tally: Vec<Vec<u64>> = questions
        .iter()
        .map(|question| vec![0; question.get_answers().len()])
        .collect();
    for _ in 0..VOTERS {
        let mut selections = vec![];
        for (question, counts) in questions.iter().zip(true_tally.iter_mut()) {
            let mut selection = vec![];
            for (k, count) in counts.iter_mut().enumerate() {
                let coin = rng.random_integer(&BigInt::from_u8(2)).unwrap() == BigInt::ONE;
                if coin && selection.len() < question.max_approvals() {
                    selection.push(k);
                    *count += 1;
                }
            }
            // top up to the minimum with the first unselected answers
            for (k, count) in counts.iter_mut().enumerate() {
                if selection.len() >= question.get_min() {
                    break;
                }
                if !selection.contains(&k) {
                    selection.push(k);
                    *count += 1;
                }
            }
            selections.push(selection);
        }

        let vote = EncryptedVote::new(&election, &selections, &mut rng).unwrap();
        let cast = vote.clear_plaintexts();
        if !tally.add_vote(&cast).unwrap() {
            panic!("A valid ballot was rejected");
        }
    }

    // The trustee releases a decryption factor with a proof for every tally ciphertext
    let factors = tally.decryption_factors(&sk, &generator, &mut rng).unwrap();
    let params = sk.get_pk().get_params();
    for (i, (totals, question_factors)) in tally
        .get_ciphertexts()
        .iter()
        .zip(factors.iter())
        .enumerate()
    {
        for (k, (total, share)) in totals.iter().zip(question_factors.iter()).enumerate() {
            if !sk
                .get_pk()
                .verify_decryption_factor(total, &share.factor, &share.proof, &generator)
            {
                panic!("Decryption factor failed to be verified");
            }
            let inverse = params.invert(&share.factor).unwrap();
            let m = params.mul(total.get_beta(), &inverse);
            let count = discrete_log(params, &m, VOTERS as u64).unwrap();
            if count != true_tally[i][k] {
                panic!("the final tally is incorrect!");
            }
            let question = &questions[i];
            println!(
                "{} {}: {}",
                question.get_short_name(),
                question.get_answers()[k],
                count
            );
        }
    }
    println!("The election is a success!");
}
