use crate::adversary::Adversary;
use crate::agent::Agent;
use crate::constants::CAPTURE_SCORE;
use crate::types::RuntimeEvent;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Contact {
    SameCell,
    Swapped,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CollisionReport {
    pub life_lost: bool,
    pub captured: Vec<usize>,
}

pub fn detect(agent: &Agent, adversary: &Adversary) -> Option<Contact> {
    if agent.position() == adversary.position() {
        return Some(Contact::SameCell);
    }
    let swapped = agent.previous() == adversary.position()
        && adversary.previous() == agent.position();
    swapped.then_some(Contact::Swapped)
}

// At most one life is lost per tick. Captured adversaries are immune.
pub fn resolve(
    agent: &mut Agent,
    adversaries: &mut [Adversary],
    respawn_ticks: u32,
    events: &mut Vec<RuntimeEvent>,
) -> CollisionReport {
    let mut report = CollisionReport::default();

    for idx in 0..adversaries.len() {
        if !adversaries[idx].is_free() {
            continue;
        }
        if detect(agent, &adversaries[idx]).is_none() {
            continue;
        }

        if agent.is_empowered() {
            let at = adversaries[idx].position();
            adversaries[idx].capture(respawn_ticks);
            agent.add_score(CAPTURE_SCORE);
            report.captured.push(adversaries[idx].id());
            events.push(RuntimeEvent::AdversaryCaptured {
                adversary_id: adversaries[idx].id(),
                x: at.x,
                y: at.y,
            });
            continue;
        }

        let lives_left = agent.lose_life();
        report.life_lost = true;
        events.push(RuntimeEvent::LifeLost {
            adversary_id: adversaries[idx].id(),
            lives_left,
        });
        if lives_left > 0 {
            agent.reset_to_spawn();
            for adversary in adversaries.iter_mut().filter(|a| a.is_free()) {
                adversary.return_home();
            }
        }
        break;
    }

    report
}
